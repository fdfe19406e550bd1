//! Windows-specific file time stamping.

use super::TimestampStamper;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use winapi::shared::minwindef::FILETIME;
use winapi::um::fileapi::{CreateFileW, OPEN_EXISTING, SetFileTime};
use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
use winapi::um::winnt::{
    FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, FILE_SHARE_WRITE, FILE_WRITE_ATTRIBUTES,
};

/// 100ns intervals between 1601-01-01 and 1970-01-01
const EPOCH_DIFFERENCE_TICKS: i128 = 116_444_736_000_000_000;

/// Sets creation, access and write times through `SetFileTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CreationTimeStamper;

impl TimestampStamper for CreationTimeStamper {
    fn name(&self) -> &'static str {
        "windows-creation-time"
    }

    fn stamp(&self, path: &Path, time: SystemTime) -> io::Result<()> {
        let wide_path: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        // Only attribute access is needed to change file times
        let handle = unsafe {
            CreateFileW(
                wide_path.as_ptr(),
                FILE_WRITE_ATTRIBUTES,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                std::ptr::null_mut(),
                OPEN_EXISTING,
                FILE_ATTRIBUTE_NORMAL,
                std::ptr::null_mut(),
            )
        };

        if handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }

        let file_time = to_filetime(time);
        let success = unsafe { SetFileTime(handle, &file_time, &file_time, &file_time) };
        let result = if success != 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        };

        unsafe {
            CloseHandle(handle);
        }

        result
    }
}

/// Convert a system time into Windows FILETIME ticks
fn filetime_ticks(time: SystemTime) -> u64 {
    let unix_ticks = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => (after.as_nanos() / 100) as i128,
        Err(before) => -((before.duration().as_nanos() / 100) as i128),
    };
    (unix_ticks + EPOCH_DIFFERENCE_TICKS).max(0) as u64
}

fn to_filetime(time: SystemTime) -> FILETIME {
    let ticks = filetime_ticks(time);
    FILETIME {
        dwLowDateTime: ticks as u32,
        dwHighDateTime: (ticks >> 32) as u32,
    }
}
