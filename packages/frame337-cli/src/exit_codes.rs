use frame337_harness::HarnessError;

pub const SUCCESS: i32 = 0;
pub const EXECUTION_ERROR: i32 = 1;
pub const INPUT_ERROR: i32 = 2;
pub const BINARY_NOT_FOUND: i32 = 3;
pub const PARTIAL_FAILURE: i32 = 4;
pub const TESTS_FAILED: i32 = 5;

pub fn for_error(error: &HarnessError) -> i32 {
    match error {
        HarnessError::BinaryNotFound(_) => BINARY_NOT_FOUND,
        HarnessError::FileNotFound(_)
        | HarnessError::ManifestIo { .. }
        | HarnessError::Glob(_)
        | HarnessError::InvalidParameter(_) => INPUT_ERROR,
        _ => EXECUTION_ERROR,
    }
}
