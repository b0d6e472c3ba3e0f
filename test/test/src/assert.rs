// Shadow the std assertion macros so that a failing check ends the current step with an error
// instead of panicking inside REAPER.

macro_rules! assert {
    ($condition:expr) => {{
        if !($condition) {
            return Err(concat!("Assertion failed: ", stringify!($condition)).into());
        }
    }};
    ($condition:expr, $($arg:tt)+) => {{
        if !($condition) {
            return Err(format!($($arg)+).into());
        }
    }};
}

macro_rules! assert_eq {
    ($actual:expr, $expected:expr) => {
        match (&$actual, &$expected) {
            (actual_val, expected_val) => {
                if *actual_val != *expected_val {
                    return Err(format!(
                        "`{}` is\n\n```\n{:#?}\n```\n\nbut `{}` is\n\n```\n{:#?}\n```",
                        stringify!($actual),
                        actual_val,
                        stringify!($expected),
                        expected_val,
                    )
                    .into());
                }
            }
        }
    };
}

macro_rules! assert_approx {
    ($actual:expr, $expected:expr) => {
        match ($actual.as_f64(), $expected as f64) {
            (Some(actual_val), expected_val) => {
                assert!(
                    approx::abs_diff_eq!(actual_val, expected_val, epsilon = 0.001),
                    "`{}` is {} but should be about {}",
                    stringify!($actual),
                    actual_val,
                    expected_val
                );
            }
            (None, _) => {
                return Err(format!("`{}` is not a number", stringify!($actual)).into());
            }
        }
    };
}
