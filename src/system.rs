//! Plugin state, environment and machine queries.


pub const CAPABILITY: &str = "system";

pub const DECLARATIONS: &str = r#"
CString Ver();
long SetPath(const TCHAR * path);
long StrStr(const TCHAR * s,const TCHAR * str);
long SendCommand(const TCHAR * cmd);
CString GetBasePath();
long SetShowErrorMsg(long show);
long Beep(long fre,long delay);
CString GetEnv(long index,const TCHAR * name);
long SetEnv(long index,const TCHAR * name,const TCHAR * value);
long DelEnv(long index,const TCHAR * name);
CString GetPath();
long EnterCri();
long LeaveCri();
long Log(const TCHAR * info);
long GetTime();
long GetScreenWidth();
long GetScreenHeight();
CString GetDiskSerial(long index);
CString Md5(const TCHAR * str);
CString GetMac();
long GetScreenDepth();
long SetScreen(long width,long height,long depth);
long ExitOs(long tpe);
CString GetDir(long tpe);
long GetOsType();
long DownCpu(long tpe,long rate);
long GetID();
long RegEx(const TCHAR * code,const TCHAR * Ver,const TCHAR * ip);
CString GetMachineCode();
long SetClipboard(const TCHAR * data);
CString GetClipboard();
long Is64Bit();
long GetLastError();
CString GetNetTime();
long CheckUAC();
long SetUAC(long uac);
long DisableFontSmooth();
long CheckFontSmooth();
long SetDisplayAcceler(long level);
long delay(long mis);
long Stop(long id);
CString GetNetTimeSafe();
long DmGuard(long en,const TCHAR * tpe);
long GetDmCount();
long DisableScreenSave();
long DisablePowerSave();
CString GetMachineCodeNoMac();
long Reg(const TCHAR * code,const TCHAR * Ver);
long RegNoMac(const TCHAR * code,const TCHAR * Ver);
long RegExNoMac(const TCHAR * code,const TCHAR * Ver,const TCHAR * ip);
CString GetNetTimeByIp(const TCHAR * ip);
long Delays(long min_s,long max_s);
long InitCri();
CString GetDisplayInfo();
long EnableFontSmooth();
long SetAero(long en);
long DisableCloseDisplayAndSleep();
long Int64ToInt32(LONGLONG v);
long GetLocale();
long SetLocale();
long GetDPI();
long GetCpuType();
long ReleaseRef();
long SetExitThread(long en);
long GetFps();
CString ExecuteCmd(const TCHAR * cmd,const TCHAR * current_dir,long time_out);
long SpeedNormalGraphic(long en);
long UnLoadDriver();
long GetOsBuildNumber();
long HackSpeed(double rate);
CString DmGuardParams(const TCHAR * cmd,const TCHAR * sub_cmd,const TCHAR * param);
long IsSurrpotVt();
CString GetDiskModel(long index);
CString GetDiskReversion(long index);
long GetCpuUsage();
long GetMemoryUsage();
CString Hex32(long v);
CString Hex64(LONGLONG v);
long DmGuardExtract(const TCHAR * tpe,const TCHAR * path);
long DmGuardLoadCustom(const TCHAR * tpe,const TCHAR * path);
CString GetSystemInfo(const TCHAR * tpe,long method);
"#;

dm_api! {
    /// Version, paths, environment and machine information.
    pub trait System {
        /// Version string of the loaded object.
        fn ver() -> String = "Ver";
        /// Base directory for every relative picture, dictionary and file path.
        fn set_path(path: &str) -> i32 = "SetPath";
        fn str_str(haystack: &str, needle: &str) -> i32 = "StrStr";
        fn send_command(cmd: &str) -> i32 = "SendCommand";
        /// Directory the object itself was loaded from.
        fn get_base_path() -> String = "GetBasePath";
        fn set_show_error_msg(show: i32) -> i32 = "SetShowErrorMsg";
        fn beep(freq: i32, delay: i32) -> i32 = "Beep";
        fn get_env(index: i32, name: &str) -> String = "GetEnv";
        fn set_env(index: i32, name: &str, value: &str) -> i32 = "SetEnv";
        fn del_env(index: i32, name: &str) -> i32 = "DelEnv";
        /// Current base directory set by `set_path`.
        fn get_path() -> String = "GetPath";
        /// Object-side critical section; pairs with `leave_cri`.
        fn enter_cri() -> i32 = "EnterCri";
        fn leave_cri() -> i32 = "LeaveCri";
        fn log(info: &str) -> i32 = "Log";
        fn get_time() -> i32 = "GetTime";
        fn get_screen_width() -> i32 = "GetScreenWidth";
        fn get_screen_height() -> i32 = "GetScreenHeight";
        fn get_disk_serial(index: i32) -> String = "GetDiskSerial";
        fn md5(text: &str) -> String = "Md5";
        fn get_mac() -> String = "GetMac";
        fn get_screen_depth() -> i32 = "GetScreenDepth";
        fn set_screen(width: i32, height: i32, depth: i32) -> i32 = "SetScreen";
        fn exit_os(kind: i32) -> i32 = "ExitOs";
        fn get_dir(kind: i32) -> String = "GetDir";
        fn get_os_type() -> i32 = "GetOsType";
        fn down_cpu(kind: i32, rate: i32) -> i32 = "DownCpu";
        /// Identifier of this object instance.
        fn get_id() -> i32 = "GetID";
        fn reg_ex(code: &str, ver: &str, ip: &str) -> i32 = "RegEx";
        fn get_machine_code() -> String = "GetMachineCode";
        fn set_clipboard(data: &str) -> i32 = "SetClipboard";
        fn get_clipboard() -> String = "GetClipboard";
        fn is_64bit() -> i32 = "Is64Bit";
        /// Detail code of the most recent failed call, as kept by the object.
        fn get_last_error() -> i32 = "GetLastError";
        fn get_net_time() -> String = "GetNetTime";
        fn check_uac() -> i32 = "CheckUAC";
        fn set_uac(uac: i32) -> i32 = "SetUAC";
        fn disable_font_smooth() -> i32 = "DisableFontSmooth";
        fn check_font_smooth() -> i32 = "CheckFontSmooth";
        fn set_display_acceler(level: i32) -> i32 = "SetDisplayAcceler";
        fn delay(ms: i32) -> i32 = "delay";
        /// Cancel a blocking call running on the instance `id`.
        fn stop(id: i32) -> i32 = "Stop";
        fn get_net_time_safe() -> String = "GetNetTimeSafe";
        fn dm_guard(enable: bool, kind: &str) -> i32 = "DmGuard";
        /// Number of live object instances in the process.
        fn get_dm_count() -> i32 = "GetDmCount";
        fn disable_screen_save() -> i32 = "DisableScreenSave";
        fn disable_power_save() -> i32 = "DisablePowerSave";
        fn get_machine_code_no_mac() -> String = "GetMachineCodeNoMac";
        fn reg(code: &str, ver: &str) -> i32 = "Reg";
        fn reg_no_mac(code: &str, ver: &str) -> i32 = "RegNoMac";
        fn reg_ex_no_mac(code: &str, ver: &str, ip: &str) -> i32 = "RegExNoMac";
        fn get_net_time_by_ip(ip: &str) -> String = "GetNetTimeByIp";
        /// Sleep a random time in `min_s..=max_s` milliseconds.
        fn delays(min_s: i32, max_s: i32) -> i32 = "Delays";
        /// Reset the object-side critical section state.
        fn init_cri() -> i32 = "InitCri";
        fn get_display_info() -> String = "GetDisplayInfo";
        fn enable_font_smooth() -> i32 = "EnableFontSmooth";
        fn set_aero(enable: bool) -> i32 = "SetAero";
        fn disable_close_display_and_sleep() -> i32 = "DisableCloseDisplayAndSleep";
        fn int64_to_int32(value: i64) -> i32 = "Int64ToInt32";
        fn get_locale() -> i32 = "GetLocale";
        fn set_locale() -> i32 = "SetLocale";
        fn get_dpi() -> i32 = "GetDPI";
        fn get_cpu_type() -> i32 = "GetCpuType";
        fn release_ref() -> i32 = "ReleaseRef";
        fn set_exit_thread(enable: bool) -> i32 = "SetExitThread";
        fn get_fps() -> i32 = "GetFps";
        /// Run a shell command and return its output.
        fn execute_cmd(cmd: &str, current_dir: &str, time_out: i32) -> String = "ExecuteCmd";
        fn speed_normal_graphic(enable: bool) -> i32 = "SpeedNormalGraphic";
        fn un_load_driver() -> i32 = "UnLoadDriver";
        fn get_os_build_number() -> i32 = "GetOsBuildNumber";
        fn hack_speed(rate: f64) -> i32 = "HackSpeed";
        fn dm_guard_params(cmd: &str, sub_cmd: &str, param: &str) -> String = "DmGuardParams";
        fn is_surrpot_vt() -> i32 = "IsSurrpotVt";
        fn get_disk_model(index: i32) -> String = "GetDiskModel";
        fn get_disk_reversion(index: i32) -> String = "GetDiskReversion";
        fn get_cpu_usage() -> i32 = "GetCpuUsage";
        fn get_memory_usage() -> i32 = "GetMemoryUsage";
        fn hex32(value: i32) -> String = "Hex32";
        fn hex64(value: i64) -> String = "Hex64";
        fn dm_guard_extract(kind: &str, path: &str) -> i32 = "DmGuardExtract";
        fn dm_guard_load_custom(kind: &str, path: &str) -> i32 = "DmGuardLoadCustom";
        fn get_system_info(kind: &str, method: i32) -> String = "GetSystemInfo";
    }
}
