use std::os::raw::{c_char, c_void};
use std::sync::Once;

/// A no-op log callback used to silence logs emitted by whisper.cpp.
unsafe extern "C" fn discard_whisper_log(
    _level: u32,
    _c_msg: *const c_char,
    _user_data: *mut c_void,
) {
    // Intentionally left empty.
}

/// Route whisper.cpp logging into the void, exactly once per process.
///
/// whisper.cpp writes directly to stderr otherwise, which clobbers our own
/// log stream and any piped output.
pub(super) fn init_whisper_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| unsafe {
        whisper_rs::set_log_callback(Some(discard_whisper_log), std::ptr::null_mut());
    });
}
