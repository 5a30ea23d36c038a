//! Keyboard and mouse simulation.

use dmsoft_bridge::ArgList;

use crate::Result;
use crate::args::{Point, Rect, push_outs};
use crate::composite::point_if_found;

pub const CAPABILITY: &str = "keyboard_mouse";

pub const DECLARATIONS: &str = r#"
long KeyPress(long vk);
long KeyDown(long vk);
long KeyUp(long vk);
long LeftClick();
long RightClick();
long MiddleClick();
long LeftDoubleClick();
long LeftDown();
long LeftUp();
long RightDown();
long RightUp();
long MoveTo(long x,long y);
long MoveR(long rx,long ry);
long MoveDD(long dx,long dy);
long WheelUp();
long WheelDown();
long SetMouseDelay(const TCHAR * tpe,long delay);
long SetKeypadDelay(const TCHAR * tpe,long delay);
CString MoveToEx(long x,long y,long w,long h);
long GetCursorPos(long * x,long * y);
CString GetCursorShape();
CString GetCursorSpot();
long LockInput(long locks);
long KeyDownChar(const TCHAR * key_str);
long KeyUpChar(const TCHAR * key_str);
long KeyPressChar(const TCHAR * key_str);
long KeyPressStr(const TCHAR * key_str,long delay);
long EnableKeypadPatch(long en);
long EnableKeypadSync(long en,long time_out);
long EnableMouseSync(long en,long time_out);
long EnableRealMouse(long en,long mousedelay,long mousestep);
long EnableRealKeypad(long en);
CString GetCursorShapeEx(long tpe);
long SetSimMode(long mode);
long LockMouseRect(long x1,long y1,long x2,long y2);
long GetKeyState(long vk);
long WaitKey(long key_code,long time_out);
long EnableKeypadMsg(long en);
long EnableMouseMsg(long en);
long MiddleDown();
long MiddleUp();
long SetMouseSpeed(long speed);
long GetMouseSpeed();
long EnableMouseAccuracy(long en);
long SetInputDm(long input_dm,long rx,long ry);
"#;

dm_api! {
    /// Input simulation through the current binding.
    pub trait KeyboardMouse {
        fn key_press(vk: i32) -> i32 = "KeyPress";
        fn key_down(vk: i32) -> i32 = "KeyDown";
        fn key_up(vk: i32) -> i32 = "KeyUp";
        fn left_click() -> i32 = "LeftClick";
        fn right_click() -> i32 = "RightClick";
        fn middle_click() -> i32 = "MiddleClick";
        fn left_double_click() -> i32 = "LeftDoubleClick";
        fn left_down() -> i32 = "LeftDown";
        fn left_up() -> i32 = "LeftUp";
        fn right_down() -> i32 = "RightDown";
        fn right_up() -> i32 = "RightUp";
        /// Move the cursor to absolute screen coordinates.
        fn move_to(x: i32, y: i32) -> i32 = "MoveTo";
        /// Move the cursor relative to its current position.
        fn move_r(rx: i32, ry: i32) -> i32 = "MoveR";
        fn move_dd(dx: i32, dy: i32) -> i32 = "MoveDD";
        fn wheel_up() -> i32 = "WheelUp";
        fn wheel_down() -> i32 = "WheelDown";
        /// Delay between down and up for clicks in a bind mode (`"normal"`, `"windows"`, `"dx"`).
        fn set_mouse_delay(kind: &str, delay: i32) -> i32 = "SetMouseDelay";
        fn set_keypad_delay(kind: &str, delay: i32) -> i32 = "SetKeypadDelay";
        fn move_to_ex(x: i32, y: i32, w: i32, h: i32) -> String = "MoveToEx";
        fn get_cursor_shape() -> String = "GetCursorShape";
        fn get_cursor_spot() -> String = "GetCursorSpot";
        fn lock_input(locks: i32) -> i32 = "LockInput";
        fn key_down_char(key_str: &str) -> i32 = "KeyDownChar";
        fn key_up_char(key_str: &str) -> i32 = "KeyUpChar";
        /// Press and release a key given by name (`"enter"`, `"a"`).
        fn key_press_char(key_str: &str) -> i32 = "KeyPressChar";
        /// Type `key_str` one character at a time.
        fn key_press_str(key_str: &str, delay: i32) -> i32 = "KeyPressStr";
        fn enable_keypad_patch(enable: bool) -> i32 = "EnableKeypadPatch";
        fn enable_keypad_sync(enable: bool, time_out: i32) -> i32 = "EnableKeypadSync";
        fn enable_mouse_sync(enable: bool, time_out: i32) -> i32 = "EnableMouseSync";
        fn enable_real_mouse(
            enable: bool,
            mousedelay: i32,
            mousestep: i32,
        ) -> i32 = "EnableRealMouse";
        fn enable_real_keypad(enable: bool) -> i32 = "EnableRealKeypad";
        fn get_cursor_shape_ex(kind: i32) -> String = "GetCursorShapeEx";
        fn set_sim_mode(mode: i32) -> i32 = "SetSimMode";
        fn lock_mouse_rect(rect: Rect) -> i32 = "LockMouseRect";
        fn get_key_state(vk: i32) -> i32 = "GetKeyState";
        /// Block until `key_code` is pressed or `time_out` ms pass; `key_code` 0 waits for any key.
        fn wait_key(key_code: i32, time_out: i32) -> i32 = "WaitKey";
        fn enable_keypad_msg(enable: bool) -> i32 = "EnableKeypadMsg";
        fn enable_mouse_msg(enable: bool) -> i32 = "EnableMouseMsg";
        fn middle_down() -> i32 = "MiddleDown";
        fn middle_up() -> i32 = "MiddleUp";
        fn set_mouse_speed(speed: i32) -> i32 = "SetMouseSpeed";
        fn get_mouse_speed() -> i32 = "GetMouseSpeed";
        fn enable_mouse_accuracy(enable: bool) -> i32 = "EnableMouseAccuracy";
        fn set_input_dm(input_dm: i32, rx: i32, ry: i32) -> i32 = "SetInputDm";
    }
    provided {
        fn get_cursor_pos(&self) -> Result<Option<Point>> {
            let mut args = ArgList::new();
            push_outs(&mut args, 2);
            point_if_found(&self.invoke_method("GetCursorPos", &args)?)
        }
    }
}
