//! Call-site macros.
//!
//! Every level macro accepts either a bare argument list, logged on the
//! process-wide [`logger()`](crate::logger), or `logger => args..` to target
//! a specific [`Logger`](crate::Logger).

/// Build a `Vec<Value>` from anything convertible into [`Value`](crate::Value).
///
/// ```
/// use rs_logger::{args, Object};
///
/// let list = args!["User logged in", Object::new().with("userId", 42)];
/// assert_eq!(list.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($arg)),+]
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr => $($arg:expr),* $(,)?) => {
        $logger.error(&$crate::args![$($arg),*])
    };
    ($($arg:expr),* $(,)?) => {
        $crate::logger().error(&$crate::args![$($arg),*])
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr => $($arg:expr),* $(,)?) => {
        $logger.warn(&$crate::args![$($arg),*])
    };
    ($($arg:expr),* $(,)?) => {
        $crate::logger().warn(&$crate::args![$($arg),*])
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr => $($arg:expr),* $(,)?) => {
        $logger.info(&$crate::args![$($arg),*])
    };
    ($($arg:expr),* $(,)?) => {
        $crate::logger().info(&$crate::args![$($arg),*])
    };
}

#[macro_export]
macro_rules! http {
    ($logger:expr => $($arg:expr),* $(,)?) => {
        $logger.http(&$crate::args![$($arg),*])
    };
    ($($arg:expr),* $(,)?) => {
        $crate::logger().http(&$crate::args![$($arg),*])
    };
}

#[macro_export]
macro_rules! verbose {
    ($logger:expr => $($arg:expr),* $(,)?) => {
        $logger.verbose(&$crate::args![$($arg),*])
    };
    ($($arg:expr),* $(,)?) => {
        $crate::logger().verbose(&$crate::args![$($arg),*])
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr => $($arg:expr),* $(,)?) => {
        $logger.debug(&$crate::args![$($arg),*])
    };
    ($($arg:expr),* $(,)?) => {
        $crate::logger().debug(&$crate::args![$($arg),*])
    };
}

#[macro_export]
macro_rules! silly {
    ($logger:expr => $($arg:expr),* $(,)?) => {
        $logger.silly(&$crate::args![$($arg),*])
    };
    ($($arg:expr),* $(,)?) => {
        $crate::logger().silly(&$crate::args![$($arg),*])
    };
}
