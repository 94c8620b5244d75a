//===========================================================================//

macro_rules! invalid_input {
    ($e:expr) => {
        return Err($crate::Error::InvalidInput($e.to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::Error::InvalidInput(format!($fmt, $($arg)+)))
    };
}

macro_rules! encoding_error {
    ($e:expr) => {
        return Err($crate::Error::Encoding($e.to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::Error::Encoding(format!($fmt, $($arg)+)))
    };
}

//===========================================================================//
