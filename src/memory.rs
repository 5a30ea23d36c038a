//! Reading, writing and searching another process's memory.

use dmsoft_bridge::{ArgList, ResourceKey, ResourceKind};

use crate::Result;
use crate::args::{Hwnd, PushArgs, RemoteAddr};

pub const CAPABILITY: &str = "memory";

pub const DECLARATIONS: &str = r#"
LONGLONG ReadInt(long hwnd,const TCHAR * addr,long tpe);
float ReadFloat(long hwnd,const TCHAR * addr);
double ReadDouble(long hwnd,const TCHAR * addr);
CString FindInt(long hwnd,const TCHAR * addr_range,LONGLONG int_value_min,LONGLONG int_value_max,long tpe);
CString FindFloat(long hwnd,const TCHAR * addr_range,float float_value_min,float float_value_max);
CString FindDouble(long hwnd,const TCHAR * addr_range,double double_value_min,double double_value_max);
CString FindString(long hwnd,const TCHAR * addr_range,const TCHAR * string_value,long tpe);
LONGLONG GetModuleBaseAddr(long hwnd,const TCHAR * module_name);
long WriteInt(long hwnd,const TCHAR * addr,long tpe,LONGLONG v);
long WriteFloat(long hwnd,const TCHAR * addr,float v);
long WriteDouble(long hwnd,const TCHAR * addr,double v);
long WriteString(long hwnd,const TCHAR * addr,long tpe,const TCHAR * v);
long AsmAdd(const TCHAR * asm_ins);
long AsmClear();
LONGLONG AsmCall(long hwnd,long mode);
CString Assemble(LONGLONG base_addr,long is_64bit);
CString DisAssemble(const TCHAR * asm_code,LONGLONG base_addr,long is_64bit);
CString ReadData(long hwnd,const TCHAR * addr,long length);
long WriteData(long hwnd,const TCHAR * addr,const TCHAR * data);
CString FindData(long hwnd,const TCHAR * addr_range,const TCHAR * data);
CString ReadString(long hwnd,const TCHAR * addr,long tpe,long length);
CString FindIntEx(long hwnd,const TCHAR * addr_range,LONGLONG int_value_min,LONGLONG int_value_max,long tpe,long steps,long multi_thread,long mode);
CString FindFloatEx(long hwnd,const TCHAR * addr_range,float float_value_min,float float_value_max,long steps,long multi_thread,long mode);
CString FindDoubleEx(long hwnd,const TCHAR * addr_range,double double_value_min,double double_value_max,long steps,long multi_thread,long mode);
CString FindStringEx(long hwnd,const TCHAR * addr_range,const TCHAR * string_value,long tpe,long steps,long multi_thread,long mode);
CString FindDataEx(long hwnd,const TCHAR * addr_range,const TCHAR * data,long steps,long multi_thread,long mode);
long SetMemoryHwndAsProcessId(long en);
CString IntToData(LONGLONG int_value,long tpe);
CString FloatToData(float float_value);
CString DoubleToData(double double_value);
CString StringToData(const TCHAR * string_value,long tpe);
long SetMemoryFindResultToFile(const TCHAR * file_name);
long FreeProcessMemory(long hwnd);
LONGLONG VirtualAllocEx(long hwnd,LONGLONG addr,long size,long tpe);
long VirtualFreeEx(long hwnd,LONGLONG addr);
LONGLONG ReadIntAddr(long hwnd,LONGLONG addr,long tpe);
CString ReadDataAddr(long hwnd,LONGLONG addr,long length);
double ReadDoubleAddr(long hwnd,LONGLONG addr);
float ReadFloatAddr(long hwnd,LONGLONG addr);
CString ReadStringAddr(long hwnd,LONGLONG addr,long tpe,long length);
long WriteDataAddr(long hwnd,LONGLONG addr,const TCHAR * data);
long WriteDoubleAddr(long hwnd,LONGLONG addr,double v);
long WriteFloatAddr(long hwnd,LONGLONG addr,float v);
long WriteIntAddr(long hwnd,LONGLONG addr,long tpe,LONGLONG v);
long WriteStringAddr(long hwnd,LONGLONG addr,long tpe,const TCHAR * v);
long OpenProcess(long pid);
long VirtualProtectEx(long hwnd,LONGLONG addr,long size,long tpe,long old_protect);
long ReadDataToBin(long hwnd,const TCHAR * addr,long length);
long WriteDataFromBin(long hwnd,const TCHAR * addr,long data,long length);
long ReadDataAddrToBin(long hwnd,LONGLONG addr,long length);
long WriteDataAddrFromBin(long hwnd,LONGLONG addr,long data,long length);
long SetParam64ToPointer();
CString VirtualQueryEx(long hwnd,LONGLONG addr,long pmbi);
LONGLONG AsmCallEx(long hwnd,long mode,const TCHAR * base_addr);
LONGLONG GetRemoteApiAddress(long hwnd,LONGLONG base_addr,const TCHAR * fun_name);
long AsmSetTimeout(long time_out,long param);
long GetModuleSize(long hwnd,const TCHAR * module_name);
long SetShowAsmErrorMsg(long show);
"#;

dm_api! {
    /// Raw memory access in a target process.
    pub trait Memory {
        /// `addr` is an address expression such as `"[[0x400000]+4]+8"`.
        fn read_int(hwnd: Hwnd, addr: &str, kind: i32) -> i64 = "ReadInt";
        fn read_float(hwnd: Hwnd, addr: &str) -> f32 = "ReadFloat";
        fn read_double(hwnd: Hwnd, addr: &str) -> f64 = "ReadDouble";
        /// Addresses in `addr_range` holding a value between the bounds.
        fn find_int(
            hwnd: Hwnd,
            addr_range: &str,
            int_value_min: i64,
            int_value_max: i64,
            kind: i32,
        ) -> String = "FindInt";
        fn find_float(
            hwnd: Hwnd,
            addr_range: &str,
            float_value_min: f32,
            float_value_max: f32,
        ) -> String = "FindFloat";
        fn find_double(
            hwnd: Hwnd,
            addr_range: &str,
            double_value_min: f64,
            double_value_max: f64,
        ) -> String = "FindDouble";
        fn find_string(
            hwnd: Hwnd,
            addr_range: &str,
            string_value: &str,
            kind: i32,
        ) -> String = "FindString";
        /// Base address of `module_name` in the target process.
        fn get_module_base_addr(hwnd: Hwnd, module_name: &str) -> i64 = "GetModuleBaseAddr";
        fn write_int(hwnd: Hwnd, addr: &str, kind: i32, value: i64) -> i32 = "WriteInt";
        fn write_float(hwnd: Hwnd, addr: &str, value: f32) -> i32 = "WriteFloat";
        fn write_double(hwnd: Hwnd, addr: &str, value: f64) -> i32 = "WriteDouble";
        fn write_string(hwnd: Hwnd, addr: &str, kind: i32, value: &str) -> i32 = "WriteString";
        fn asm_add(asm_ins: &str) -> i32 = "AsmAdd";
        fn asm_clear() -> i32 = "AsmClear";
        /// Execute the assembled buffer in the target process.
        fn asm_call(hwnd: Hwnd, mode: i32) -> i64 = "AsmCall";
        fn assemble(base_addr: i64, is_64bit: i32) -> String = "Assemble";
        fn dis_assemble(asm_code: &str, base_addr: i64, is_64bit: i32) -> String = "DisAssemble";
        fn read_data(hwnd: Hwnd, addr: &str, length: i32) -> String = "ReadData";
        fn write_data(hwnd: Hwnd, addr: &str, data: &str) -> i32 = "WriteData";
        fn find_data(hwnd: Hwnd, addr_range: &str, data: &str) -> String = "FindData";
        fn read_string(hwnd: Hwnd, addr: &str, kind: i32, length: i32) -> String = "ReadString";
        fn find_int_ex(
            hwnd: Hwnd,
            addr_range: &str,
            int_value_min: i64,
            int_value_max: i64,
            kind: i32,
            steps: i32,
            multi_thread: i32,
            mode: i32,
        ) -> String = "FindIntEx";
        fn find_float_ex(
            hwnd: Hwnd,
            addr_range: &str,
            float_value_min: f32,
            float_value_max: f32,
            steps: i32,
            multi_thread: i32,
            mode: i32,
        ) -> String = "FindFloatEx";
        fn find_double_ex(
            hwnd: Hwnd,
            addr_range: &str,
            double_value_min: f64,
            double_value_max: f64,
            steps: i32,
            multi_thread: i32,
            mode: i32,
        ) -> String = "FindDoubleEx";
        fn find_string_ex(
            hwnd: Hwnd,
            addr_range: &str,
            string_value: &str,
            kind: i32,
            steps: i32,
            multi_thread: i32,
            mode: i32,
        ) -> String = "FindStringEx";
        fn find_data_ex(
            hwnd: Hwnd,
            addr_range: &str,
            data: &str,
            steps: i32,
            multi_thread: i32,
            mode: i32,
        ) -> String = "FindDataEx";
        fn set_memory_hwnd_as_process_id(enable: bool) -> i32 = "SetMemoryHwndAsProcessId";
        /// Binary representation of an integer for `find_data`.
        fn int_to_data(int_value: i64, kind: i32) -> String = "IntToData";
        fn float_to_data(float_value: f32) -> String = "FloatToData";
        fn double_to_data(double_value: f64) -> String = "DoubleToData";
        fn string_to_data(string_value: &str, kind: i32) -> String = "StringToData";
        fn set_memory_find_result_to_file(file_name: &str) -> i32 = "SetMemoryFindResultToFile";
        fn free_process_memory(hwnd: Hwnd) -> i32 = "FreeProcessMemory";
        /// Read from a numeric address.
        fn read_int_addr(hwnd: Hwnd, addr: i64, kind: i32) -> i64 = "ReadIntAddr";
        fn read_data_addr(hwnd: Hwnd, addr: i64, length: i32) -> String = "ReadDataAddr";
        fn read_double_addr(hwnd: Hwnd, addr: i64) -> f64 = "ReadDoubleAddr";
        fn read_float_addr(hwnd: Hwnd, addr: i64) -> f32 = "ReadFloatAddr";
        fn read_string_addr(
            hwnd: Hwnd,
            addr: i64,
            kind: i32,
            length: i32,
        ) -> String = "ReadStringAddr";
        fn write_data_addr(hwnd: Hwnd, addr: i64, data: &str) -> i32 = "WriteDataAddr";
        fn write_double_addr(hwnd: Hwnd, addr: i64, value: f64) -> i32 = "WriteDoubleAddr";
        fn write_float_addr(hwnd: Hwnd, addr: i64, value: f32) -> i32 = "WriteFloatAddr";
        /// `kind` selects the integer width.
        fn write_int_addr(hwnd: Hwnd, addr: i64, kind: i32, value: i64) -> i32 = "WriteIntAddr";
        fn write_string_addr(
            hwnd: Hwnd,
            addr: i64,
            kind: i32,
            value: &str,
        ) -> i32 = "WriteStringAddr";
        fn open_process(pid: i32) -> i32 = "OpenProcess";
        fn virtual_protect_ex(
            hwnd: Hwnd,
            addr: i64,
            size: i32,
            kind: i32,
            old_protect: i32,
        ) -> i32 = "VirtualProtectEx";
        fn read_data_to_bin(hwnd: Hwnd, addr: &str, length: i32) -> i32 = "ReadDataToBin";
        fn write_data_from_bin(
            hwnd: Hwnd,
            addr: &str,
            data: i32,
            length: i32,
        ) -> i32 = "WriteDataFromBin";
        fn read_data_addr_to_bin(hwnd: Hwnd, addr: i64, length: i32) -> i32 = "ReadDataAddrToBin";
        fn write_data_addr_from_bin(
            hwnd: Hwnd,
            addr: i64,
            data: i32,
            length: i32,
        ) -> i32 = "WriteDataAddrFromBin";
        fn set_param64_to_pointer() -> i32 = "SetParam64ToPointer";
        fn virtual_query_ex(hwnd: Hwnd, addr: i64, pmbi: i32) -> String = "VirtualQueryEx";
        fn asm_call_ex(hwnd: Hwnd, mode: i32, base_addr: &str) -> i64 = "AsmCallEx";
        fn get_remote_api_address(
            hwnd: Hwnd,
            base_addr: i64,
            fun_name: &str,
        ) -> i64 = "GetRemoteApiAddress";
        fn asm_set_timeout(time_out: i32, param: i32) -> i32 = "AsmSetTimeout";
        fn get_module_size(hwnd: Hwnd, module_name: &str) -> i32 = "GetModuleSize";
        fn set_show_asm_error_msg(show: i32) -> i32 = "SetShowAsmErrorMsg";
    }
    provided {
        /// Reserve memory in the target process. `addr` 0 lets the system
        /// choose.
        fn virtual_alloc_ex(
            &self,
            hwnd: Hwnd,
            addr: i64,
            size: i32,
            kind: i32,
        ) -> Result<Option<RemoteAddr>> {
            let mut args = ArgList::new();
            hwnd.push_args(&mut args)?;
            args.push(addr).push(size).push(kind);
            let base: i64 = self.call("VirtualAllocEx", args)?;
            if base == 0 {
                return Ok(None);
            }
            self.resources()
                .register(ResourceKind::RemoteMemory, ResourceKey::remote(hwnd.0, base));
            Ok(Some(RemoteAddr(base)))
        }

        fn virtual_free_ex(&self, hwnd: Hwnd, addr: RemoteAddr) -> Result<i32> {
            let key = ResourceKey::remote(hwnd.0, addr.0);
            self.resources().check_releasable(ResourceKind::RemoteMemory, &key)?;
            let mut args = ArgList::new();
            hwnd.push_args(&mut args)?;
            args.push(addr.0);
            let status: i32 = self.call("VirtualFreeEx", args)?;
            if status != 0 {
                self.resources().release(ResourceKind::RemoteMemory, &key)?;
            }
            Ok(status)
        }
    }
}
