//! Capture upload to an answer server.

use dmsoft_bridge::{ArgList, RawHandle, ResourceKey, ResourceKind, ResourceRegistry};

use crate::Result;
use crate::args::{CaptureHandle, PushArgs, Rect};

pub const CAPABILITY: &str = "faq";

pub const DECLARATIONS: &str = r#"
long FaqCapture(long x1,long y1,long x2,long y2,long quality,long delay,long time);
long FaqRelease(long handle);
CString FaqSend(const TCHAR * server,long handle,long request_type,long time_out);
long FaqGetSize(long handle);
long FaqPost(const TCHAR * server,long handle,long request_type,long time_out);
CString FaqFetch();
long FaqCaptureFromFile(long x1,long y1,long x2,long y2,const TCHAR * file_name,long quality);
long FaqCancel();
long FaqIsPosted();
long FaqCaptureString(const TCHAR * str);
"#;

dm_api! {
    /// Capture and answer-server requests.
    pub trait Faq {
        /// Answer of the last `faq_post`, empty until it arrives.
        fn faq_fetch() -> String = "FaqFetch";
        /// Abandon an outstanding `faq_post`.
        fn faq_cancel() -> i32 = "FaqCancel";
        /// Nonzero while a posted request is outstanding.
        fn faq_is_posted() -> i32 = "FaqIsPosted";
    }
    provided {
        /// Capture `rect` as a jpeg sequence held by the object.
        fn faq_capture(
            &self,
            rect: Rect,
            quality: i32,
            delay: i32,
            time: i32,
        ) -> Result<Option<CaptureHandle>> {
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(quality).push(delay).push(time);
            let handle: i32 = self.call("FaqCapture", args)?;
            Ok(track_capture(self.resources(), handle))
        }

        fn faq_capture_from_file(
            &self,
            rect: Rect,
            file_name: &str,
            quality: i32,
        ) -> Result<Option<CaptureHandle>> {
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(file_name).push(quality);
            let handle: i32 = self.call("FaqCaptureFromFile", args)?;
            Ok(track_capture(self.resources(), handle))
        }

        fn faq_capture_string(&self, text: &str) -> Result<Option<CaptureHandle>> {
            let handle: i32 = self.call("FaqCaptureString", ArgList::from_args(text))?;
            Ok(track_capture(self.resources(), handle))
        }

        fn faq_release(&self, handle: CaptureHandle) -> Result<i32> {
            let key = ResourceKey::id(handle.0);
            self.resources().check_releasable(ResourceKind::Capture, &key)?;
            let status: i32 = self.call("FaqRelease", ArgList::from_args(RawHandle(handle.0)))?;
            if status != 0 {
                self.resources().release(ResourceKind::Capture, &key)?;
            }
            Ok(status)
        }

        /// Send a capture and block for the answer.
        fn faq_send(
            &self,
            server: &str,
            handle: CaptureHandle,
            request_type: i32,
            time_out: i32,
        ) -> Result<String> {
            self.resources()
                .check_live(ResourceKind::Capture, &ResourceKey::id(handle.0))?;
            self.call(
                "FaqSend",
                ArgList::from_args((server, RawHandle(handle.0), request_type, time_out)),
            )
        }

        /// Send a capture without waiting; poll with `faq_is_posted`.
        fn faq_post(
            &self,
            server: &str,
            handle: CaptureHandle,
            request_type: i32,
            time_out: i32,
        ) -> Result<i32> {
            self.resources()
                .check_live(ResourceKind::Capture, &ResourceKey::id(handle.0))?;
            self.call(
                "FaqPost",
                ArgList::from_args((server, RawHandle(handle.0), request_type, time_out)),
            )
        }

        fn faq_get_size(&self, handle: CaptureHandle) -> Result<i32> {
            self.resources()
                .check_live(ResourceKind::Capture, &ResourceKey::id(handle.0))?;
            self.call("FaqGetSize", ArgList::from_args(RawHandle(handle.0)))
        }
    }
}

fn track_capture(resources: &ResourceRegistry, handle: i32) -> Option<CaptureHandle> {
    if handle == 0 {
        return None;
    }
    let handle = CaptureHandle(i64::from(handle));
    resources.register(ResourceKind::Capture, ResourceKey::id(handle.0));
    Some(handle)
}
