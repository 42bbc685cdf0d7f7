//! Runtime debugging tools.

#[cfg(feature = "debug-tools")]
extern crate backtrace;

/// Execute closure when the environment variable, `CSORTVEC_DEBUG_MODE`, is set.
///
/// When compiled without feature `debug-tools`, this is a NOP.
#[cfg(feature = "debug-tools")]
pub fn exec<F: FnOnce()>(f: F) {
    use self::backtrace::Backtrace;
    use std::env;

    thread_local! {
        /// Is `CSORTVEC_DEBUG_MODE` set?
        ///
        /// This is cached to avoid expensive repeated syscalls or similar things.
        static DEBUG_MODE_ENABLED: bool = env::var("CSORTVEC_DEBUG_MODE").is_ok();
        /// Is `CSORTVEC_DEBUG_STACKTRACE` set?
        ///
        /// This is cached to avoid expensive repeated syscalls or similar things.
        static STACK_TRACE_ENABLED: bool = env::var("CSORTVEC_DEBUG_STACKTRACE").is_ok();
    }

    // If enabled, run the closure.
    if DEBUG_MODE_ENABLED.with(|&x| x) {
        f();
        if STACK_TRACE_ENABLED.with(|&x| x) {
            println!("{:?}", Backtrace::new());
        }
    }
}

/// Do nothing.
///
/// When compiled with feature `debug-tools`, this will execute the closure when envvar
/// `CSORTVEC_DEBUG_MODE` is set.
#[inline]
#[cfg(not(feature = "debug-tools"))]
pub fn exec<F: FnOnce()>(_: F) {}
