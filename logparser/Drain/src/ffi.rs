//! C ABI entry point, for driving the parser from other languages.

use std::ffi::CStr;
use std::os::raw::c_char;

use crate::config::{DrainConfig, ParserConfig};
use crate::parser::LogParser;

/// Parse `indir/log_name` and write the CSV results into `outdir`.
///
/// Returns 0 on success, -1 if a pointer is null, -2 if the configuration
/// or a pattern is invalid, and -3 if parsing fails. Failures are also
/// printed to stderr, since a C host usually installs no logger.
///
/// # Safety
///
/// All string pointers must be valid NUL-terminated C strings, and
/// `regex_patterns_ptr` must point to `regex_patterns_len` such pointers.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn parse(
    indir_ptr: *const c_char,
    outdir_ptr: *const c_char,
    log_name_ptr: *const c_char,
    log_format_ptr: *const c_char,
    regex_patterns_ptr: *const *const c_char,
    regex_patterns_len: usize,
    st: f64,
    depth: usize,
) -> i32 {
    if indir_ptr.is_null()
        || outdir_ptr.is_null()
        || log_name_ptr.is_null()
        || log_format_ptr.is_null()
        || (regex_patterns_ptr.is_null() && regex_patterns_len > 0)
    {
        return -1;
    }

    let preprocess_patterns = if regex_patterns_len == 0 {
        vec![]
    } else {
        let ptrs = std::slice::from_raw_parts(regex_patterns_ptr, regex_patterns_len);
        let mut patterns = Vec::with_capacity(ptrs.len());
        for &p in ptrs {
            if p.is_null() {
                return -1;
            }
            patterns.push(lossy_string(p));
        }
        patterns
    };

    let config = ParserConfig {
        input_dir: lossy_string(indir_ptr).into(),
        output_dir: lossy_string(outdir_ptr).into(),
        log_format: lossy_string(log_format_ptr),
        preprocess_patterns,
        keep_parameters: true,
        drain: DrainConfig::new(depth, st),
    };

    let mut log_parser = match LogParser::new(&config) {
        Ok(parser) => parser,
        Err(e) => {
            eprintln!("invalid parser configuration, error is {e}");
            return -2;
        }
    };

    match log_parser.parse(&lossy_string(log_name_ptr)) {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("fail to parse, error is {e}");
            -3
        }
    }
}

unsafe fn lossy_string(ptr: *const c_char) -> String {
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}
