//! Window lookup, binding and process queries.

use dmsoft_bridge::ArgList;

use crate::Result;
use crate::args::{Hwnd, Point, PushArgs, Rect, Size, push_outs};
use crate::composite::{point_if_found, rect_if_found, size_if_found};

pub const CAPABILITY: &str = "window";

pub const DECLARATIONS: &str = r#"
long UnBindWindow();
long ClientToScreen(long hwnd,[in,out] long * x,[in,out] long * y);
long ScreenToClient(long hwnd,[in,out] long * x,[in,out] long * y);
long GetClientSize(long hwnd,long * width,long * height);
long MoveWindow(long hwnd,long x,long y);
long GetForegroundWindow();
long GetForegroundFocus();
long GetMousePointWindow();
long GetPointWindow(long x,long y);
CString EnumWindow(long parent,const TCHAR * title,const TCHAR * class_name,long filter);
long GetWindowState(long hwnd,long flag);
long GetWindow(long hwnd,long flag);
long GetSpecialWindow(long flag);
long SetWindowText(long hwnd,const TCHAR * text);
long SetWindowSize(long hwnd,long width,long height);
long GetWindowRect(long hwnd,long * x1,long * y1,long * x2,long * y2);
CString GetWindowTitle(long hwnd);
CString GetWindowClass(long hwnd);
long SetWindowState(long hwnd,long flag);
long SendString(long hwnd,const TCHAR * str);
long SetClientSize(long hwnd,long width,long height);
long SetWindowTransparent(long hwnd,long v);
long SetDisplayInput(const TCHAR * mode);
long BindWindowEx(long hwnd,const TCHAR * display,const TCHAR * mouse,const TCHAR * keypad,const TCHAR * public_desc,long mode);
long ActiveInputMethod(long hwnd,const TCHAR * id);
long CheckInputMethod(long hwnd,const TCHAR * id);
long FindInputMethod(const TCHAR * id);
long BindWindow(long hwnd,const TCHAR * display,const TCHAR * mouse,const TCHAR * keypad,long mode);
long FindWindow(const TCHAR * class_name,const TCHAR * title_name);
long FindWindowEx(long parent,const TCHAR * class_name,const TCHAR * title_name);
long SendString2(long hwnd,const TCHAR * str);
long GetWindowProcessId(long hwnd);
CString GetWindowProcessPath(long hwnd);
CString EnumWindowByProcess(const TCHAR * process_name,const TCHAR * title,const TCHAR * class_name,long filter);
long FindWindowByProcess(const TCHAR * process_name,const TCHAR * class_name,const TCHAR * title_name);
long FindWindowByProcessId(long process_id,const TCHAR * class_name,const TCHAR * title_name);
long RunApp(const TCHAR * path,long mode);
long FindWindowSuper(const TCHAR * spec1,long flag1,long type1,const TCHAR * spec2,long flag2,long type2);
long ForceUnBindWindow(long hwnd);
long SendStringIme(const TCHAR * str);
long IsBind(long hwnd);
long SetDisplayDelay(long t);
long GetClientRect(long hwnd,long * x1,long * y1,long * x2,long * y2);
long EnableFakeActive(long en);
long EnableBind(long en);
long SendPaste(long hwnd);
long EnableSpeedDx(long en);
long EnableIme(long en);
long LockDisplay(long locks);
CString EnumWindowSuper(const TCHAR * spec1,long flag1,long type1,const TCHAR * spec2,long flag2,long type2,long sort);
long SetEnumWindowDelay(long delay);
long GetBindWindow();
CString GetCommandLine(long hwnd);
long TerminateProcess(long pid);
CString EnumProcess(const TCHAR * name);
CString GetProcessInfo(long pid);
long SwitchBindWindow(long hwnd);
long SendStringIme2(long hwnd,const TCHAR * str,long mode);
CString EnumWindowByProcessId(long pid,const TCHAR * title,const TCHAR * class_name,long filter);
long SetDisplayRefreshDelay(long t);
long ShowTaskBarIcon(long hwnd,long is_show);
long GetWindowThreadId(long hwnd);
"#;

dm_api! {
    /// Window enumeration, state and binding.
    pub trait Window {
        /// Undo the current binding.
        fn un_bind_window() -> i32 = "UnBindWindow";
        fn move_window(hwnd: Hwnd, x: i32, y: i32) -> i32 = "MoveWindow";
        fn get_foreground_window() -> Hwnd = "GetForegroundWindow";
        fn get_foreground_focus() -> Hwnd = "GetForegroundFocus";
        fn get_mouse_point_window() -> Hwnd = "GetMousePointWindow";
        fn get_point_window(x: i32, y: i32) -> Hwnd = "GetPointWindow";
        /// Child windows of `parent` as a comma-separated handle list.
        fn enum_window(
            parent: Hwnd,
            title: &str,
            class_name: &str,
            filter: i32,
        ) -> String = "EnumWindow";
        /// `flag` selects the state to test (exists, active, visible, ...).
        fn get_window_state(hwnd: Hwnd, flag: i32) -> i32 = "GetWindowState";
        fn get_window(hwnd: Hwnd, flag: i32) -> Hwnd = "GetWindow";
        fn get_special_window(flag: i32) -> Hwnd = "GetSpecialWindow";
        fn set_window_text(hwnd: Hwnd, text: &str) -> i32 = "SetWindowText";
        fn set_window_size(hwnd: Hwnd, width: i32, height: i32) -> i32 = "SetWindowSize";
        fn get_window_title(hwnd: Hwnd) -> String = "GetWindowTitle";
        fn get_window_class(hwnd: Hwnd) -> String = "GetWindowClass";
        /// Change window state; `flag` selects close, activate, minimize, ...
        fn set_window_state(hwnd: Hwnd, flag: i32) -> i32 = "SetWindowState";
        fn send_string(hwnd: Hwnd, text: &str) -> i32 = "SendString";
        fn set_client_size(hwnd: Hwnd, width: i32, height: i32) -> i32 = "SetClientSize";
        fn set_window_transparent(hwnd: Hwnd, value: i32) -> i32 = "SetWindowTransparent";
        fn set_display_input(mode: &str) -> i32 = "SetDisplayInput";
        /// Like `bind_window` with a public attribute string.
        fn bind_window_ex(
            hwnd: Hwnd,
            display: &str,
            mouse: &str,
            keypad: &str,
            public_desc: &str,
            mode: i32,
        ) -> i32 = "BindWindowEx";
        fn active_input_method(hwnd: Hwnd, id: &str) -> i32 = "ActiveInputMethod";
        fn check_input_method(hwnd: Hwnd, id: &str) -> i32 = "CheckInputMethod";
        fn find_input_method(id: &str) -> i32 = "FindInputMethod";
        /// Route display, mouse and keyboard of the object through `hwnd`.
        fn bind_window(
            hwnd: Hwnd,
            display: &str,
            mouse: &str,
            keypad: &str,
            mode: i32,
        ) -> i32 = "BindWindow";
        /// First top-level window matching class and title; empty strings match anything.
        fn find_window(class_name: &str, title_name: &str) -> Hwnd = "FindWindow";
        fn find_window_ex(
            parent: Hwnd,
            class_name: &str,
            title_name: &str,
        ) -> Hwnd = "FindWindowEx";
        fn send_string2(hwnd: Hwnd, text: &str) -> i32 = "SendString2";
        fn get_window_process_id(hwnd: Hwnd) -> i32 = "GetWindowProcessId";
        /// Executable path of the process owning `hwnd`.
        fn get_window_process_path(hwnd: Hwnd) -> String = "GetWindowProcessPath";
        fn enum_window_by_process(
            process_name: &str,
            title: &str,
            class_name: &str,
            filter: i32,
        ) -> String = "EnumWindowByProcess";
        fn find_window_by_process(
            process_name: &str,
            class_name: &str,
            title_name: &str,
        ) -> Hwnd = "FindWindowByProcess";
        fn find_window_by_process_id(
            process_id: i32,
            class_name: &str,
            title_name: &str,
        ) -> Hwnd = "FindWindowByProcessId";
        fn run_app(path: &str, mode: i32) -> i32 = "RunApp";
        fn find_window_super(
            spec1: &str,
            flag1: i32,
            type1: i32,
            spec2: &str,
            flag2: i32,
            type2: i32,
        ) -> Hwnd = "FindWindowSuper";
        fn force_un_bind_window(hwnd: Hwnd) -> i32 = "ForceUnBindWindow";
        fn send_string_ime(text: &str) -> i32 = "SendStringIme";
        fn is_bind(hwnd: Hwnd) -> i32 = "IsBind";
        fn set_display_delay(t: i32) -> i32 = "SetDisplayDelay";
        fn enable_fake_active(enable: bool) -> i32 = "EnableFakeActive";
        fn enable_bind(enable: bool) -> i32 = "EnableBind";
        fn send_paste(hwnd: Hwnd) -> i32 = "SendPaste";
        fn enable_speed_dx(enable: bool) -> i32 = "EnableSpeedDx";
        fn enable_ime(enable: bool) -> i32 = "EnableIme";
        fn lock_display(locks: i32) -> i32 = "LockDisplay";
        fn enum_window_super(
            spec1: &str,
            flag1: i32,
            type1: i32,
            spec2: &str,
            flag2: i32,
            type2: i32,
            sort: i32,
        ) -> String = "EnumWindowSuper";
        fn set_enum_window_delay(delay: i32) -> i32 = "SetEnumWindowDelay";
        fn get_bind_window() -> Hwnd = "GetBindWindow";
        fn get_command_line(hwnd: Hwnd) -> String = "GetCommandLine";
        fn terminate_process(pid: i32) -> i32 = "TerminateProcess";
        fn enum_process(name: &str) -> String = "EnumProcess";
        fn get_process_info(pid: i32) -> String = "GetProcessInfo";
        fn switch_bind_window(hwnd: Hwnd) -> i32 = "SwitchBindWindow";
        fn send_string_ime2(hwnd: Hwnd, text: &str, mode: i32) -> i32 = "SendStringIme2";
        fn enum_window_by_process_id(
            pid: i32,
            title: &str,
            class_name: &str,
            filter: i32,
        ) -> String = "EnumWindowByProcessId";
        fn set_display_refresh_delay(t: i32) -> i32 = "SetDisplayRefreshDelay";
        fn show_task_bar_icon(hwnd: Hwnd, show: bool) -> i32 = "ShowTaskBarIcon";
        fn get_window_thread_id(hwnd: Hwnd) -> i32 = "GetWindowThreadId";
    }
    provided {
        /// Convert a client-area point of `hwnd` to screen coordinates.
        fn client_to_screen(&self, hwnd: Hwnd, point: Point) -> Result<Option<Point>> {
            let mut args = ArgList::new();
            hwnd.push_args(&mut args)?;
            args.push_in_out(point.x).push_in_out(point.y);
            point_if_found(&self.invoke_method("ClientToScreen", &args)?)
        }

        fn screen_to_client(&self, hwnd: Hwnd, point: Point) -> Result<Option<Point>> {
            let mut args = ArgList::new();
            hwnd.push_args(&mut args)?;
            args.push_in_out(point.x).push_in_out(point.y);
            point_if_found(&self.invoke_method("ScreenToClient", &args)?)
        }

        fn get_client_size(&self, hwnd: Hwnd) -> Result<Option<Size>> {
            let mut args = ArgList::new();
            hwnd.push_args(&mut args)?;
            push_outs(&mut args, 2);
            size_if_found(&self.invoke_method("GetClientSize", &args)?)
        }

        fn get_window_rect(&self, hwnd: Hwnd) -> Result<Option<Rect>> {
            let mut args = ArgList::new();
            hwnd.push_args(&mut args)?;
            push_outs(&mut args, 4);
            rect_if_found(&self.invoke_method("GetWindowRect", &args)?)
        }

        /// Client area in screen coordinates.
        fn get_client_rect(&self, hwnd: Hwnd) -> Result<Option<Rect>> {
            let mut args = ArgList::new();
            hwnd.push_args(&mut args)?;
            push_outs(&mut args, 4);
            rect_if_found(&self.invoke_method("GetClientRect", &args)?)
        }
    }
}
