use scythe_daw::{DawError, DawResult};
use std::ffi::{c_char, c_int, CStr, CString};
use std::path::Path;

/// Flag which REAPER sets on track and marker colors which are not the theme default.
pub const CUSTOM_COLOR_FLAG: c_int = 0x0100_0000;

/// Lets REAPER fill a string buffer of the given size.
///
/// Only needed for functions which `reaper-medium` doesn't wrap. Returns the decoded content
/// along with whatever the fill function returned.
pub fn with_string_buffer<T>(max_size: u32, fill: impl FnOnce(*mut c_char, i32) -> T) -> (String, T) {
    let mut buffer = vec![0u8; max_size as usize];
    let result = fill(buffer.as_mut_ptr() as *mut c_char, max_size as i32);
    let len = buffer.iter().position(|b| *b == 0).unwrap_or(buffer.len());
    buffer.truncate(len);
    (String::from_utf8_lossy(&buffer).into_owned(), result)
}

/// Copies a string returned by REAPER. Null is treated as empty string.
///
/// # Safety
///
/// `ptr` must be null or point to a valid nul-terminated string.
pub unsafe fn copy_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

pub fn to_c_string(value: &str, what: &'static str) -> DawResult<CString> {
    CString::new(value).map_err(|_| DawError::InvalidString { what })
}

pub fn path_to_c_string(path: &Path) -> DawResult<CString> {
    let s = path.to_str().ok_or(DawError::InvalidString { what: "path" })?;
    to_c_string(s, "path")
}

pub fn ok_or_failed(success: bool, function: &'static str) -> DawResult<()> {
    if success {
        Ok(())
    } else {
        Err(DawError::failed(function))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_buffers() {
        let (content, ok) = with_string_buffer(8, |buf, size| {
            assert_eq!(size, 8);
            unsafe {
                std::ptr::copy_nonoverlapping(b"abc\0".as_ptr() as *const c_char, buf, 4);
            }
            true
        });
        assert_eq!(content, "abc");
        assert!(ok);
        let (content, ok) = with_string_buffer(8, |_, _| false);
        assert_eq!(content, "");
        assert!(!ok);
    }

    #[test]
    fn unterminated_content_is_cut_at_buffer_end() {
        let (content, _) = with_string_buffer(4, |buf, size| unsafe {
            std::ptr::copy_nonoverlapping(b"abcdef".as_ptr() as *const c_char, buf, size as usize);
        });
        assert_eq!(content, "abcd");
    }

    #[test]
    fn nul_bytes_are_rejected() {
        assert!(to_c_string("a\0b", "name").is_err());
        assert_eq!(
            ok_or_failed(false, "DeleteTrackMediaItem"),
            Err(DawError::failed("DeleteTrackMediaItem"))
        );
    }
}
