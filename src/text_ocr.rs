//! Dictionary-based OCR and string search.

use dmsoft_bridge::ArgList;

use crate::Result;
use crate::args::{Found, Point, PushArgs, Rect, push_outs, require_text};
use crate::composite::{found_at, named_point, point_if_found};

pub const CAPABILITY: &str = "text_ocr";

pub const DECLARATIONS: &str = r#"
CString Ocr(long x1,long y1,long x2,long y2,const TCHAR * color,double sim);
long FindStr(long x1,long y1,long x2,long y2,const TCHAR * str,const TCHAR * color,double sim,long * x,long * y);
long GetResultCount(const TCHAR * str);
long GetResultPos(const TCHAR * str,long index,long * x,long * y);
long UseDict(long index);
long SetDictPwd(const TCHAR * pwd);
CString OcrInFile(long x1,long y1,long x2,long y2,const TCHAR * pic_name,const TCHAR * color,double sim);
long SetMinRowGap(long row_gap);
long SetMinColGap(long col_gap);
long SetWordLineHeight(long line_height);
long SetWordGap(long word_gap);
long SetRowGapNoDict(long row_gap);
long SetColGapNoDict(long col_gap);
long SetWordLineHeightNoDict(long line_height);
long SetWordGapNoDict(long word_gap);
long GetWordResultCount(const TCHAR * str);
long GetWordResultPos(const TCHAR * str,long index,long * x,long * y);
CString GetWordResultStr(const TCHAR * str,long index);
CString GetWords(long x1,long y1,long x2,long y2,const TCHAR * color,double sim);
CString GetWordsNoDict(long x1,long y1,long x2,long y2,const TCHAR * color);
long SetDict(long index,const TCHAR * dict_name);
long AddDict(long index,const TCHAR * dict_info);
CString FindStrE(long x1,long y1,long x2,long y2,const TCHAR * str,const TCHAR * color,double sim);
long SetExactOcr(long exact_ocr);
CString OcrEx(long x1,long y1,long x2,long y2,const TCHAR * color,double sim);
long SetExportDict(long index,const TCHAR * dict_name);
CString FetchWord(long x1,long y1,long x2,long y2,const TCHAR * color,const TCHAR * word);
long FindStrWithFont(long x1,long y1,long x2,long y2,const TCHAR * str,const TCHAR * color,double sim,const TCHAR * font_name,long font_size,long flag,long * x,long * y);
CString FindStrWithFontE(long x1,long y1,long x2,long y2,const TCHAR * str,const TCHAR * color,double sim,const TCHAR * font_name,long font_size,long flag);
CString FindStrWithFontEx(long x1,long y1,long x2,long y2,const TCHAR * str,const TCHAR * color,double sim,const TCHAR * font_name,long font_size,long flag);
CString GetDictInfo(const TCHAR * str,const TCHAR * font_name,long font_size,long flag);
long SaveDict(long index,const TCHAR * file_name);
long FindStrFast(long x1,long y1,long x2,long y2,const TCHAR * str,const TCHAR * color,double sim,long * x,long * y);
CString FindStrFastEx(long x1,long y1,long x2,long y2,const TCHAR * str,const TCHAR * color,double sim);
CString FindStrFastE(long x1,long y1,long x2,long y2,const TCHAR * str,const TCHAR * color,double sim);
long GetNowDict();
long GetDictCount(long index);
long SetDictMem(long index,long addr,long size);
CString FindStrEx(long x1,long y1,long x2,long y2,const TCHAR * str,const TCHAR * color,double sim);
CString FindStrS(long x1,long y1,long x2,long y2,const TCHAR * str,const TCHAR * color,double sim,long * x,long * y);
CString FindStrExS(long x1,long y1,long x2,long y2,const TCHAR * str,const TCHAR * color,double sim);
CString FindStrFastS(long x1,long y1,long x2,long y2,const TCHAR * str,const TCHAR * color,double sim,long * x,long * y);
CString FindStrFastExS(long x1,long y1,long x2,long y2,const TCHAR * str,const TCHAR * color,double sim);
long ClearDict(long index);
CString GetDict(long index,long font_index);
CString OcrExOne(long x1,long y1,long x2,long y2,const TCHAR * color,double sim);
long EnableShareDict(long en);
"#;

dm_api! {
    /// Text recognition against the loaded dictionaries.
    pub trait TextOcr {
        /// Recognize text in `rect` using the current dictionary.
        fn ocr(rect: Rect, color: &str, sim: f64) -> String = "Ocr" [nonempty color];
        fn get_result_count(text: &str) -> i32 = "GetResultCount";
        /// Select the dictionary used by subsequent OCR calls.
        fn use_dict(index: i32) -> i32 = "UseDict";
        fn set_dict_pwd(pwd: &str) -> i32 = "SetDictPwd";
        fn ocr_in_file(
            rect: Rect,
            pic_name: &str,
            color: &str,
            sim: f64,
        ) -> String = "OcrInFile" [nonempty color];
        fn set_min_row_gap(row_gap: i32) -> i32 = "SetMinRowGap";
        fn set_min_col_gap(col_gap: i32) -> i32 = "SetMinColGap";
        fn set_word_line_height(line_height: i32) -> i32 = "SetWordLineHeight";
        fn set_word_gap(word_gap: i32) -> i32 = "SetWordGap";
        fn set_row_gap_no_dict(row_gap: i32) -> i32 = "SetRowGapNoDict";
        fn set_col_gap_no_dict(col_gap: i32) -> i32 = "SetColGapNoDict";
        fn set_word_line_height_no_dict(line_height: i32) -> i32 = "SetWordLineHeightNoDict";
        fn set_word_gap_no_dict(word_gap: i32) -> i32 = "SetWordGapNoDict";
        fn get_word_result_count(text: &str) -> i32 = "GetWordResultCount";
        fn get_word_result_str(text: &str, index: i32) -> String = "GetWordResultStr";
        /// Segment `rect` into words without a dictionary.
        fn get_words(rect: Rect, color: &str, sim: f64) -> String = "GetWords" [nonempty color];
        fn get_words_no_dict(rect: Rect, color: &str) -> String = "GetWordsNoDict" [nonempty color];
        /// Load a dictionary file into slot `index`.
        fn set_dict(index: i32, dict_name: &str) -> i32 = "SetDict";
        fn add_dict(index: i32, dict_info: &str) -> i32 = "AddDict";
        /// First match as `id|x|y`; parse with `results::parse_e_triplet`.
        fn find_str_e(
            rect: Rect,
            text: &str,
            color: &str,
            sim: f64,
        ) -> String = "FindStrE" [nonempty color];
        fn set_exact_ocr(exact: bool) -> i32 = "SetExactOcr";
        /// Recognized characters with their positions (`c$x$y|...`).
        fn ocr_ex(rect: Rect, color: &str, sim: f64) -> String = "OcrEx" [nonempty color];
        fn set_export_dict(index: i32, dict_name: &str) -> i32 = "SetExportDict";
        fn fetch_word(rect: Rect, color: &str, word: &str) -> String = "FetchWord" [nonempty color];
        fn find_str_with_font_e(
            rect: Rect,
            text: &str,
            color: &str,
            sim: f64,
            font_name: &str,
            font_size: i32,
            flag: i32,
        ) -> String = "FindStrWithFontE" [nonempty color];
        fn find_str_with_font_ex(
            rect: Rect,
            text: &str,
            color: &str,
            sim: f64,
            font_name: &str,
            font_size: i32,
            flag: i32,
        ) -> String = "FindStrWithFontEx" [nonempty color];
        fn get_dict_info(
            text: &str,
            font_name: &str,
            font_size: i32,
            flag: i32,
        ) -> String = "GetDictInfo";
        fn save_dict(index: i32, file_name: &str) -> i32 = "SaveDict";
        fn find_str_fast_ex(
            rect: Rect,
            text: &str,
            color: &str,
            sim: f64,
        ) -> String = "FindStrFastEx" [nonempty color];
        fn find_str_fast_e(
            rect: Rect,
            text: &str,
            color: &str,
            sim: f64,
        ) -> String = "FindStrFastE" [nonempty color];
        /// Index of the selected dictionary.
        fn get_now_dict() -> i32 = "GetNowDict";
        fn get_dict_count(index: i32) -> i32 = "GetDictCount";
        fn set_dict_mem(index: i32, addr: i32, size: i32) -> i32 = "SetDictMem";
        /// Every match as `id,x,y|...`; parse with `results::parse_ex_positions`.
        fn find_str_ex(
            rect: Rect,
            text: &str,
            color: &str,
            sim: f64,
        ) -> String = "FindStrEx" [nonempty color];
        fn find_str_ex_s(
            rect: Rect,
            text: &str,
            color: &str,
            sim: f64,
        ) -> String = "FindStrExS" [nonempty color];
        fn find_str_fast_ex_s(
            rect: Rect,
            text: &str,
            color: &str,
            sim: f64,
        ) -> String = "FindStrFastExS" [nonempty color];
        fn clear_dict(index: i32) -> i32 = "ClearDict";
        fn get_dict(index: i32, font_index: i32) -> String = "GetDict";
        fn ocr_ex_one(rect: Rect, color: &str, sim: f64) -> String = "OcrExOne" [nonempty color];
        fn enable_share_dict(enable: bool) -> i32 = "EnableShareDict";
    }
    provided {
        /// Position of the first of `text`'s `|`-separated alternatives.
        fn find_str(&self, rect: Rect, text: &str, color: &str, sim: f64) -> Result<Option<Found>> {
            require_text("color", color)?;
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(text).push(color).push(sim);
            push_outs(&mut args, 2);
            found_at(&self.invoke_method("FindStr", &args)?)
        }

        fn find_str_fast(
            &self,
            rect: Rect,
            text: &str,
            color: &str,
            sim: f64,
        ) -> Result<Option<Found>> {
            require_text("color", color)?;
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(text).push(color).push(sim);
            push_outs(&mut args, 2);
            found_at(&self.invoke_method("FindStrFast", &args)?)
        }

        /// Like [`find_str`](Self::find_str) but returns the matched text.
        fn find_str_s(
            &self,
            rect: Rect,
            text: &str,
            color: &str,
            sim: f64,
        ) -> Result<Option<(String, Point)>> {
            require_text("color", color)?;
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(text).push(color).push(sim);
            push_outs(&mut args, 2);
            named_point(&self.invoke_method("FindStrS", &args)?)
        }

        fn find_str_fast_s(
            &self,
            rect: Rect,
            text: &str,
            color: &str,
            sim: f64,
        ) -> Result<Option<(String, Point)>> {
            require_text("color", color)?;
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(text).push(color).push(sim);
            push_outs(&mut args, 2);
            named_point(&self.invoke_method("FindStrFastS", &args)?)
        }

        /// Search using a system font instead of a dictionary.
        #[allow(clippy::too_many_arguments)]
        fn find_str_with_font(
            &self,
            rect: Rect,
            text: &str,
            color: &str,
            sim: f64,
            font_name: &str,
            font_size: i32,
            flag: i32,
        ) -> Result<Option<Found>> {
            require_text("color", color)?;
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(text)
                .push(color)
                .push(sim)
                .push(font_name)
                .push(font_size)
                .push(flag);
            push_outs(&mut args, 2);
            found_at(&self.invoke_method("FindStrWithFont", &args)?)
        }

        /// Position of the `index`th hit in a result string of `FindStrEx`.
        fn get_result_pos(&self, results: &str, index: i32) -> Result<Option<Point>> {
            let mut args = ArgList::from_args((results, index));
            push_outs(&mut args, 2);
            point_if_found(&self.invoke_method("GetResultPos", &args)?)
        }

        fn get_word_result_pos(&self, results: &str, index: i32) -> Result<Option<Point>> {
            let mut args = ArgList::from_args((results, index));
            push_outs(&mut args, 2);
            point_if_found(&self.invoke_method("GetWordResultPos", &args)?)
        }
    }
}
