//! Overlay windows drawn on top of a target.

use crate::args::{Hwnd, Rect};

pub const CAPABILITY: &str = "foobar";

pub const DECLARATIONS: &str = r#"
long ShowScrMsg(long x1,long y1,long x2,long y2,const TCHAR * msg,const TCHAR * color);
long CreateFoobarRect(long hwnd,long x,long y,long w,long h);
long CreateFoobarRoundRect(long hwnd,long x,long y,long w,long h,long rw,long rh);
long CreateFoobarEllipse(long hwnd,long x,long y,long w,long h);
long CreateFoobarCustom(long hwnd,long x,long y,const TCHAR * pic,const TCHAR * trans_color,double sim);
long FoobarFillRect(long hwnd,long x1,long y1,long x2,long y2,const TCHAR * color);
long FoobarDrawText(long hwnd,long x,long y,long w,long h,const TCHAR * text,const TCHAR * color,long align);
long FoobarDrawPic(long hwnd,long x,long y,const TCHAR * pic,const TCHAR * trans_color);
long FoobarUpdate(long hwnd);
long FoobarLock(long hwnd);
long FoobarUnlock(long hwnd);
long FoobarSetFont(long hwnd,const TCHAR * font_name,long size,long flag);
long FoobarTextRect(long hwnd,long x,long y,long w,long h);
long FoobarPrintText(long hwnd,const TCHAR * text,const TCHAR * color);
long FoobarClearText(long hwnd);
long FoobarTextLineGap(long hwnd,long gap);
long FoobarClose(long hwnd);
long FoobarTextPrintDir(long hwnd,long dir);
long FoobarDrawLine(long hwnd,long x1,long y1,long x2,long y2,const TCHAR * color,long style,long width);
long FoobarSetSave(long hwnd,const TCHAR * file_name,long en,const TCHAR * header);
long FoobarStartGif(long hwnd,long x,long y,const TCHAR * pic_name,long repeat_limit,long delay);
long FoobarStopGif(long hwnd,long x,long y,const TCHAR * pic_name);
long FoobarSetTrans(long hwnd,long trans,const TCHAR * color,double sim);
"#;

dm_api! {
    /// Overlay drawing.
    pub trait Foobar {
        /// Show `msg` in an on-screen box that stays until replaced.
        fn show_scr_msg(rect: Rect, msg: &str, color: &str) -> i32 = "ShowScrMsg" [nonempty color];
        /// Rectangular overlay window on top of `hwnd`.
        fn create_foobar_rect(
            hwnd: Hwnd,
            x: i32,
            y: i32,
            w: i32,
            h: i32,
        ) -> Hwnd = "CreateFoobarRect";
        fn create_foobar_round_rect(
            hwnd: Hwnd,
            x: i32,
            y: i32,
            w: i32,
            h: i32,
            rw: i32,
            rh: i32,
        ) -> Hwnd = "CreateFoobarRoundRect";
        fn create_foobar_ellipse(
            hwnd: Hwnd,
            x: i32,
            y: i32,
            w: i32,
            h: i32,
        ) -> Hwnd = "CreateFoobarEllipse";
        fn create_foobar_custom(
            hwnd: Hwnd,
            x: i32,
            y: i32,
            pic: &str,
            trans_color: &str,
            sim: f64,
        ) -> Hwnd = "CreateFoobarCustom";
        fn foobar_fill_rect(
            hwnd: Hwnd,
            rect: Rect,
            color: &str,
        ) -> i32 = "FoobarFillRect" [nonempty color];
        fn foobar_draw_text(
            hwnd: Hwnd,
            x: i32,
            y: i32,
            w: i32,
            h: i32,
            text: &str,
            color: &str,
            align: i32,
        ) -> i32 = "FoobarDrawText" [nonempty color];
        fn foobar_draw_pic(
            hwnd: Hwnd,
            x: i32,
            y: i32,
            pic: &str,
            trans_color: &str,
        ) -> i32 = "FoobarDrawPic";
        fn foobar_update(hwnd: Hwnd) -> i32 = "FoobarUpdate";
        fn foobar_lock(hwnd: Hwnd) -> i32 = "FoobarLock";
        fn foobar_unlock(hwnd: Hwnd) -> i32 = "FoobarUnlock";
        fn foobar_set_font(
            hwnd: Hwnd,
            font_name: &str,
            size: i32,
            flag: i32,
        ) -> i32 = "FoobarSetFont";
        fn foobar_text_rect(hwnd: Hwnd, x: i32, y: i32, w: i32, h: i32) -> i32 = "FoobarTextRect";
        /// Append a line to the overlay text area.
        fn foobar_print_text(
            hwnd: Hwnd,
            text: &str,
            color: &str,
        ) -> i32 = "FoobarPrintText" [nonempty color];
        fn foobar_clear_text(hwnd: Hwnd) -> i32 = "FoobarClearText";
        fn foobar_text_line_gap(hwnd: Hwnd, gap: i32) -> i32 = "FoobarTextLineGap";
        /// Destroy the overlay window.
        fn foobar_close(hwnd: Hwnd) -> i32 = "FoobarClose";
        fn foobar_text_print_dir(hwnd: Hwnd, dir: i32) -> i32 = "FoobarTextPrintDir";
        fn foobar_draw_line(
            hwnd: Hwnd,
            x1: i32,
            y1: i32,
            x2: i32,
            y2: i32,
            color: &str,
            style: i32,
            width: i32,
        ) -> i32 = "FoobarDrawLine" [nonempty color];
        fn foobar_set_save(
            hwnd: Hwnd,
            file_name: &str,
            enable: bool,
            header: &str,
        ) -> i32 = "FoobarSetSave";
        fn foobar_start_gif(
            hwnd: Hwnd,
            x: i32,
            y: i32,
            pic_name: &str,
            repeat_limit: i32,
            delay: i32,
        ) -> i32 = "FoobarStartGif";
        fn foobar_stop_gif(hwnd: Hwnd, x: i32, y: i32, pic_name: &str) -> i32 = "FoobarStopGif";
        fn foobar_set_trans(
            hwnd: Hwnd,
            trans: i32,
            color: &str,
            sim: f64,
        ) -> i32 = "FoobarSetTrans" [nonempty color];
    }
}
