use std::ffi::{c_char, c_void, CStr};
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use super::backend::TimerResolution;

type Id = *mut c_void;
type Sel = *mut c_void;

#[link(name = "Foundation", kind = "framework")]
unsafe extern "C" {}

#[link(name = "objc")]
unsafe extern "C" {
    fn objc_getClass(name: *const c_char) -> Id;
    fn sel_registerName(name: *const c_char) -> Sel;
    fn objc_msgSend();
}

/// Every `NSActivityOptions` bit: user initiated, latency critical, no idle sleep,
/// no App Nap.
const ACTIVITY_OPTIONS: u64 = 0x00FF_FFFF;

/// Token returned by `beginActivityWithOptions:reason:`, retained until release.
static ACTIVITY: AtomicPtr<c_void> = AtomicPtr::new(ptr::null_mut());

/// Declares a latency-critical `NSProcessInfo` activity so the system neither naps
/// the process nor coalesces its timers.
#[derive(Debug, Copy, Clone, Default)]
pub struct ProcessActivity;

impl TimerResolution for ProcessActivity {
    fn name(&self) -> &'static str {
        "nsprocessinfo-activity"
    }

    fn begin(&self) -> bool {
        // SAFETY: message signatures below match the Foundation declarations.
        unsafe {
            let info = process_info();
            if info.is_null() {
                return false;
            }

            let begin_sel = sel(c"beginActivityWithOptions:reason:");
            if !responds_to(info, begin_sel) {
                return false;
            }

            let reason = ns_string(c"Frame pacing requires precise timer wake-ups");
            let send: unsafe extern "C" fn(Id, Sel, u64, Id) -> Id = msg_send_fn();
            let token = send(info, begin_sel, ACTIVITY_OPTIONS, reason);
            if token.is_null() {
                return false;
            }

            let retain: unsafe extern "C" fn(Id, Sel) -> Id = msg_send_fn();
            ACTIVITY.store(retain(token, sel(c"retain")), Ordering::Release);
            true
        }
    }

    fn end(&self) {
        let token = ACTIVITY.swap(ptr::null_mut(), Ordering::AcqRel);
        if token.is_null() {
            return;
        }

        // SAFETY: `token` was retained in `begin` and is released exactly once here.
        unsafe {
            let info = process_info();
            if !info.is_null() {
                let end: unsafe extern "C" fn(Id, Sel, Id) = msg_send_fn();
                end(info, sel(c"endActivity:"), token);
            }

            let release: unsafe extern "C" fn(Id, Sel) = msg_send_fn();
            release(token, sel(c"release"));
        }
    }
}

/// Reinterprets `objc_msgSend` with a concrete signature.
///
/// SAFETY: the caller must use the signature of the method actually sent.
unsafe fn msg_send_fn<F: Copy>() -> F {
    let raw: unsafe extern "C" fn() = objc_msgSend;
    // SAFETY: function pointers share size and ABI class; see above.
    unsafe { std::mem::transmute_copy(&raw) }
}

unsafe fn sel(name: &CStr) -> Sel {
    unsafe { sel_registerName(name.as_ptr()) }
}

unsafe fn process_info() -> Id {
    unsafe {
        let class = objc_getClass(c"NSProcessInfo".as_ptr());
        if class.is_null() {
            return ptr::null_mut();
        }
        let send: unsafe extern "C" fn(Id, Sel) -> Id = msg_send_fn();
        send(class, sel(c"processInfo"))
    }
}

unsafe fn responds_to(obj: Id, selector: Sel) -> bool {
    unsafe {
        let send: unsafe extern "C" fn(Id, Sel, Sel) -> i8 = msg_send_fn();
        send(obj, sel(c"respondsToSelector:"), selector) != 0
    }
}

unsafe fn ns_string(text: &CStr) -> Id {
    unsafe {
        let class = objc_getClass(c"NSString".as_ptr());
        let send: unsafe extern "C" fn(Id, Sel, *const c_char) -> Id = msg_send_fn();
        send(class, sel(c"stringWithUTF8String:"), text.as_ptr())
    }
}
