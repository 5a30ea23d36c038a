//! File, folder and ini helpers executed by the object.


pub const CAPABILITY: &str = "file_ini";

pub const DECLARATIONS: &str = r#"
long Play(const TCHAR * file_name);
CString ReadIni(const TCHAR * section,const TCHAR * key,const TCHAR * file_name);
long WriteIni(const TCHAR * section,const TCHAR * key,const TCHAR * v,const TCHAR * file_name);
long WriteFile(const TCHAR * file_name,const TCHAR * content);
CString ReadIniPwd(const TCHAR * section,const TCHAR * key,const TCHAR * file_name,const TCHAR * pwd);
long WriteIniPwd(const TCHAR * section,const TCHAR * key,const TCHAR * v,const TCHAR * file_name,const TCHAR * pwd);
long DecodeFile(const TCHAR * file_name,const TCHAR * pwd);
long EncodeFile(const TCHAR * file_name,const TCHAR * pwd);
long CopyFile(const TCHAR * src_file,const TCHAR * dst_file,long over);
long IsFileExist(const TCHAR * file_name);
long DeleteFile(const TCHAR * file_name);
long MoveFile(const TCHAR * src_file,const TCHAR * dst_file);
long CreateFolder(const TCHAR * folder_name);
long DeleteFolder(const TCHAR * folder_name);
long GetFileLength(const TCHAR * file_name);
CString ReadFile(const TCHAR * file_name);
long DeleteIni(const TCHAR * section,const TCHAR * key,const TCHAR * file_name);
long DeleteIniPwd(const TCHAR * section,const TCHAR * key,const TCHAR * file_name,const TCHAR * pwd);
CString SelectFile();
CString SelectDirectory();
long DownloadFile(const TCHAR * url,const TCHAR * save_file,long timeout);
CString ReadFileData(const TCHAR * file_name,long start_pos,long end_pos);
CString EnumIniSection(const TCHAR * file_name);
CString EnumIniSectionPwd(const TCHAR * file_name,const TCHAR * pwd);
CString EnumIniKey(const TCHAR * section,const TCHAR * file_name);
CString EnumIniKeyPwd(const TCHAR * section,const TCHAR * file_name,const TCHAR * pwd);
long IsFolderExist(const TCHAR * folder);
CString GetRealPath(const TCHAR * path);
"#;

dm_api! {
    /// Collaborator file and ini operations, forwarded as-is.
    pub trait FileIni {
        fn play(file_name: &str) -> i32 = "Play";
        /// Value of `key` in `section`; empty when absent.
        fn read_ini(section: &str, key: &str, file_name: &str) -> String = "ReadIni";
        fn write_ini(section: &str, key: &str, value: &str, file_name: &str) -> i32 = "WriteIni";
        fn write_file(file_name: &str, content: &str) -> i32 = "WriteFile";
        fn read_ini_pwd(
            section: &str,
            key: &str,
            file_name: &str,
            pwd: &str,
        ) -> String = "ReadIniPwd";
        /// Like `write_ini` for a file encrypted with `pwd`.
        fn write_ini_pwd(
            section: &str,
            key: &str,
            value: &str,
            file_name: &str,
            pwd: &str,
        ) -> i32 = "WriteIniPwd";
        fn decode_file(file_name: &str, pwd: &str) -> i32 = "DecodeFile";
        fn encode_file(file_name: &str, pwd: &str) -> i32 = "EncodeFile";
        fn copy_file(src_file: &str, dst_file: &str, overwrite: bool) -> i32 = "CopyFile";
        fn is_file_exist(file_name: &str) -> i32 = "IsFileExist";
        fn delete_file(file_name: &str) -> i32 = "DeleteFile";
        fn move_file(src_file: &str, dst_file: &str) -> i32 = "MoveFile";
        fn create_folder(folder_name: &str) -> i32 = "CreateFolder";
        fn delete_folder(folder_name: &str) -> i32 = "DeleteFolder";
        fn get_file_length(file_name: &str) -> i32 = "GetFileLength";
        fn read_file(file_name: &str) -> String = "ReadFile";
        fn delete_ini(section: &str, key: &str, file_name: &str) -> i32 = "DeleteIni";
        fn delete_ini_pwd(
            section: &str,
            key: &str,
            file_name: &str,
            pwd: &str,
        ) -> i32 = "DeleteIniPwd";
        fn select_file() -> String = "SelectFile";
        fn select_directory() -> String = "SelectDirectory";
        /// Fetch `url` into `save_file`; `timeout` in milliseconds.
        fn download_file(url: &str, save_file: &str, timeout: i32) -> i32 = "DownloadFile";
        /// Bytes `start_pos..end_pos` as hex text.
        fn read_file_data(file_name: &str, start_pos: i32, end_pos: i32) -> String = "ReadFileData";
        /// Section names separated by `|`.
        fn enum_ini_section(file_name: &str) -> String = "EnumIniSection";
        fn enum_ini_section_pwd(file_name: &str, pwd: &str) -> String = "EnumIniSectionPwd";
        fn enum_ini_key(section: &str, file_name: &str) -> String = "EnumIniKey";
        fn enum_ini_key_pwd(section: &str, file_name: &str, pwd: &str) -> String = "EnumIniKeyPwd";
        fn is_folder_exist(folder: &str) -> i32 = "IsFolderExist";
        fn get_real_path(path: &str) -> String = "GetRealPath";
    }
}
