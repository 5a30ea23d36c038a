//! Screen capture, pixel colors and picture matching.

use dmsoft_bridge::{ArgList, ResourceKey, ResourceKind, picture_keys, picture_patterns};

use crate::Result;
use crate::args::{
    Found, Point, PushArgs, Rect, ScreenBitmap, ScreenDataHandle, Size, push_outs, require_text,
};
use crate::composite::{found_at, named_point, point_if_found};

pub const CAPABILITY: &str = "pic_color";

pub const DECLARATIONS: &str = r#"
long Capture(long x1,long y1,long x2,long y2,const TCHAR * file_name);
CString GetColor(long x,long y);
CString GetColorBGR(long x,long y);
CString RGB2BGR(const TCHAR * rgb_color);
CString BGR2RGB(const TCHAR * bgr_color);
long CmpColor(long x,long y,const TCHAR * color,double sim);
long FindColor(long x1,long y1,long x2,long y2,const TCHAR * color,double sim,long dir,long * x,long * y);
CString FindColorEx(long x1,long y1,long x2,long y2,const TCHAR * color,double sim,long dir);
CString GetColorHSV(long x,long y);
CString GetAveRGB(long x1,long y1,long x2,long y2);
CString GetAveHSV(long x1,long y1,long x2,long y2);
long LoadPic(const TCHAR * pic_name);
long FreePic(const TCHAR * pic_name);
long GetScreenData(long x1,long y1,long x2,long y2);
long FreeScreenData(long handle);
long FindPic(long x1,long y1,long x2,long y2,const TCHAR * pic_name,const TCHAR * delta_color,double sim,long dir,long * x,long * y);
CString FindPicEx(long x1,long y1,long x2,long y2,const TCHAR * pic_name,const TCHAR * delta_color,double sim,long dir);
CString MatchPicName(const TCHAR * pic_name);
long FindMultiColor(long x1,long y1,long x2,long y2,const TCHAR * first_color,const TCHAR * offset_color,double sim,long dir,long * x,long * y);
CString FindMultiColorEx(long x1,long y1,long x2,long y2,const TCHAR * first_color,const TCHAR * offset_color,double sim,long dir);
long SetPicPwd(const TCHAR * pwd);
CString FindColorE(long x1,long y1,long x2,long y2,const TCHAR * color,double sim,long dir);
CString FindPicE(long x1,long y1,long x2,long y2,const TCHAR * pic_name,const TCHAR * delta_color,double sim,long dir);
CString FindMultiColorE(long x1,long y1,long x2,long y2,const TCHAR * first_color,const TCHAR * offset_color,double sim,long dir);
long CaptureJpg(long x1,long y1,long x2,long y2,const TCHAR * file_name,long quality);
CString GetPicSize(const TCHAR * pic_name);
long CapturePng(long x1,long y1,long x2,long y2,const TCHAR * file_name);
long CaptureGif(long x1,long y1,long x2,long y2,const TCHAR * file_name,long delay,long time);
long ImageToBmp(const TCHAR * pic_name,const TCHAR * bmp_name);
long EnableDisplayDebug(long enable_debug);
long CapturePre(const TCHAR * file_name);
long GetColorNum(long x1,long y1,long x2,long y2,const TCHAR * color,double sim);
long EnableGetColorByCapture(long en);
CString ExcludePos(const TCHAR * all_pos,long tpe,long x1,long y1,long x2,long y2);
CString FindNearestPos(const TCHAR * all_pos,long tpe,long x,long y);
CString SortPosDistance(const TCHAR * all_pos,long tpe,long x,long y);
long FindPicMem(long x1,long y1,long x2,long y2,const TCHAR * pic_info,const TCHAR * delta_color,double sim,long dir,long * x,long * y);
CString FindPicMemEx(long x1,long y1,long x2,long y2,const TCHAR * pic_info,const TCHAR * delta_color,double sim,long dir);
CString FindPicMemE(long x1,long y1,long x2,long y2,const TCHAR * pic_info,const TCHAR * delta_color,double sim,long dir);
CString AppendPicAddr(const TCHAR * pic_info,long addr,long size);
long FindShape(long x1,long y1,long x2,long y2,const TCHAR * offset_color,double sim,long dir,long * x,long * y);
CString FindShapeE(long x1,long y1,long x2,long y2,const TCHAR * offset_color,double sim,long dir);
CString FindShapeEx(long x1,long y1,long x2,long y2,const TCHAR * offset_color,double sim,long dir);
CString FindPicS(long x1,long y1,long x2,long y2,const TCHAR * pic_name,const TCHAR * delta_color,double sim,long dir,long * x,long * y);
CString FindPicExS(long x1,long y1,long x2,long y2,const TCHAR * pic_name,const TCHAR * delta_color,double sim,long dir);
long GetScreenDataBmp(long x1,long y1,long x2,long y2,long * data,long * size);
long IsDisplayDead(long x1,long y1,long x2,long y2,long t);
long FindMulColor(long x1,long y1,long x2,long y2,const TCHAR * color,double sim);
long FindColorBlock(long x1,long y1,long x2,long y2,const TCHAR * color,double sim,long count,long width,long height,long * x,long * y);
CString FindColorBlockEx(long x1,long y1,long x2,long y2,const TCHAR * color,double sim,long count,long width,long height);
long EnablePicCache(long en);
long LoadPicByte(long addr,long size,const TCHAR * name);
long SetExcludeRegion(long tpe,const TCHAR * info);
long EnableFindPicMultithread(long en);
long SetFindPicMultithreadCount(long count);
long FindPicSim(long x1,long y1,long x2,long y2,const TCHAR * pic_name,const TCHAR * delta_color,long sim,long dir,long * x,long * y);
CString FindPicSimEx(long x1,long y1,long x2,long y2,const TCHAR * pic_name,const TCHAR * delta_color,long sim,long dir);
long FindPicSimMem(long x1,long y1,long x2,long y2,const TCHAR * pic_info,const TCHAR * delta_color,long sim,long dir,long * x,long * y);
CString FindPicSimMemEx(long x1,long y1,long x2,long y2,const TCHAR * pic_info,const TCHAR * delta_color,long sim,long dir);
CString FindPicSimE(long x1,long y1,long x2,long y2,const TCHAR * pic_name,const TCHAR * delta_color,long sim,long dir);
CString FindPicSimMemE(long x1,long y1,long x2,long y2,const TCHAR * pic_info,const TCHAR * delta_color,long sim,long dir);
"#;

dm_api! {
    /// Color queries and picture search inside a screen rectangle.
    ///
    /// Searches come in several shapes: the plain form returns the first hit,
    /// `Ex` returns all hits as text, `E` returns the first hit as text and `S`
    /// returns the matched name. They are kept apart because their result
    /// encodings differ.
    pub trait PicColor {
        /// Save `rect` as a bmp file.
        fn capture(rect: Rect, file_name: &str) -> i32 = "Capture";
        /// Color of one pixel as `rrggbb`.
        fn get_color(x: i32, y: i32) -> String = "GetColor";
        fn get_color_bgr(x: i32, y: i32) -> String = "GetColorBGR";
        fn rgb_to_bgr(rgb_color: &str) -> String = "RGB2BGR";
        fn bgr_to_rgb(bgr_color: &str) -> String = "BGR2RGB";
        /// `0` when the pixel matches `color`, `1` otherwise.
        fn cmp_color(x: i32, y: i32, color: &str, sim: f64) -> i32 = "CmpColor" [nonempty color];
        /// All matching pixels as `x,y|...`; parse with `results::parse_points`.
        fn find_color_ex(
            rect: Rect,
            color: &str,
            sim: f64,
            dir: i32,
        ) -> String = "FindColorEx" [nonempty color];
        fn get_color_hsv(x: i32, y: i32) -> String = "GetColorHSV";
        fn get_ave_rgb(rect: Rect) -> String = "GetAveRGB";
        fn get_ave_hsv(rect: Rect) -> String = "GetAveHSV";
        /// Every hit as `id,x,y|...`.
        fn find_pic_ex(
            rect: Rect,
            pic_name: &str,
            delta_color: &str,
            sim: f64,
            dir: i32,
        ) -> String = "FindPicEx";
        fn match_pic_name(pic_name: &str) -> String = "MatchPicName";
        fn find_multi_color_ex(
            rect: Rect,
            first_color: &str,
            offset_color: &str,
            sim: f64,
            dir: i32,
        ) -> String = "FindMultiColorEx" [nonempty first_color, offset_color];
        fn set_pic_pwd(pwd: &str) -> i32 = "SetPicPwd";
        fn find_color_e(
            rect: Rect,
            color: &str,
            sim: f64,
            dir: i32,
        ) -> String = "FindColorE" [nonempty color];
        /// First hit as `id|x|y`.
        fn find_pic_e(
            rect: Rect,
            pic_name: &str,
            delta_color: &str,
            sim: f64,
            dir: i32,
        ) -> String = "FindPicE";
        fn find_multi_color_e(
            rect: Rect,
            first_color: &str,
            offset_color: &str,
            sim: f64,
            dir: i32,
        ) -> String = "FindMultiColorE" [nonempty first_color, offset_color];
        fn capture_jpg(rect: Rect, file_name: &str, quality: i32) -> i32 = "CaptureJpg";
        /// Picture size as `w,h`.
        fn get_pic_size(pic_name: &str) -> String = "GetPicSize";
        fn capture_png(rect: Rect, file_name: &str) -> i32 = "CapturePng";
        fn capture_gif(rect: Rect, file_name: &str, delay: i32, time: i32) -> i32 = "CaptureGif";
        fn image_to_bmp(pic_name: &str, bmp_name: &str) -> i32 = "ImageToBmp";
        fn enable_display_debug(enable: bool) -> i32 = "EnableDisplayDebug";
        fn capture_pre(file_name: &str) -> i32 = "CapturePre";
        fn get_color_num(rect: Rect, color: &str, sim: f64) -> i32 = "GetColorNum" [nonempty color];
        fn enable_get_color_by_capture(enable: bool) -> i32 = "EnableGetColorByCapture";
        /// Filter a position list by `rect`; `kind` picks the list format.
        fn exclude_pos(all_pos: &str, kind: i32, rect: Rect) -> String = "ExcludePos";
        /// The entry of a position list closest to `(x, y)`.
        fn find_nearest_pos(all_pos: &str, kind: i32, x: i32, y: i32) -> String = "FindNearestPos";
        fn sort_pos_distance(
            all_pos: &str,
            kind: i32,
            x: i32,
            y: i32,
        ) -> String = "SortPosDistance";
        fn find_pic_mem_ex(
            rect: Rect,
            pic_info: &str,
            delta_color: &str,
            sim: f64,
            dir: i32,
        ) -> String = "FindPicMemEx";
        fn find_pic_mem_e(
            rect: Rect,
            pic_info: &str,
            delta_color: &str,
            sim: f64,
            dir: i32,
        ) -> String = "FindPicMemE";
        fn append_pic_addr(pic_info: &str, addr: i32, size: i32) -> String = "AppendPicAddr";
        fn find_shape_e(
            rect: Rect,
            offset_color: &str,
            sim: f64,
            dir: i32,
        ) -> String = "FindShapeE" [nonempty offset_color];
        fn find_shape_ex(
            rect: Rect,
            offset_color: &str,
            sim: f64,
            dir: i32,
        ) -> String = "FindShapeEx" [nonempty offset_color];
        fn find_pic_ex_s(
            rect: Rect,
            pic_name: &str,
            delta_color: &str,
            sim: f64,
            dir: i32,
        ) -> String = "FindPicExS";
        fn is_display_dead(rect: Rect, t: i32) -> i32 = "IsDisplayDead";
        fn find_mul_color(
            rect: Rect,
            color: &str,
            sim: f64,
        ) -> i32 = "FindMulColor" [nonempty color];
        fn find_color_block_ex(
            rect: Rect,
            color: &str,
            sim: f64,
            count: i32,
            width: i32,
            height: i32,
        ) -> String = "FindColorBlockEx" [nonempty color];
        fn enable_pic_cache(enable: bool) -> i32 = "EnablePicCache";
        fn load_pic_byte(addr: i32, size: i32, name: &str) -> i32 = "LoadPicByte";
        fn set_exclude_region(kind: i32, info: &str) -> i32 = "SetExcludeRegion";
        fn enable_find_pic_multithread(enable: bool) -> i32 = "EnableFindPicMultithread";
        fn set_find_pic_multithread_count(count: i32) -> i32 = "SetFindPicMultithreadCount";
        fn find_pic_sim_ex(
            rect: Rect,
            pic_name: &str,
            delta_color: &str,
            sim: i32,
            dir: i32,
        ) -> String = "FindPicSimEx";
        fn find_pic_sim_mem_ex(
            rect: Rect,
            pic_info: &str,
            delta_color: &str,
            sim: i32,
            dir: i32,
        ) -> String = "FindPicSimMemEx";
        fn find_pic_sim_e(
            rect: Rect,
            pic_name: &str,
            delta_color: &str,
            sim: i32,
            dir: i32,
        ) -> String = "FindPicSimE";
        fn find_pic_sim_mem_e(
            rect: Rect,
            pic_info: &str,
            delta_color: &str,
            sim: i32,
            dir: i32,
        ) -> String = "FindPicSimMemE";
    }
    provided {
        /// First pixel in `rect` matching `color`.
        fn find_color(&self, rect: Rect, color: &str, sim: f64, dir: i32) -> Result<Option<Point>> {
            require_text("color", color)?;
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(color).push(sim).push(dir);
            push_outs(&mut args, 2);
            point_if_found(&self.invoke_method("FindColor", &args)?)
        }

        /// Search `rect` for any picture of a `|`-separated list.
        fn find_pic(
            &self,
            rect: Rect,
            pic_name: &str,
            delta_color: &str,
            sim: f64,
            dir: i32,
        ) -> Result<Option<Found>> {
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(pic_name).push(delta_color).push(sim).push(dir);
            push_outs(&mut args, 2);
            found_at(&self.invoke_method("FindPic", &args)?)
        }

        /// Like [`find_pic`](Self::find_pic) but reports the matched file name.
        fn find_pic_s(
            &self,
            rect: Rect,
            pic_name: &str,
            delta_color: &str,
            sim: f64,
            dir: i32,
        ) -> Result<Option<(String, Point)>> {
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(pic_name).push(delta_color).push(sim).push(dir);
            push_outs(&mut args, 2);
            named_point(&self.invoke_method("FindPicS", &args)?)
        }

        /// Pictures supplied as `addr,size` descriptors instead of files.
        fn find_pic_mem(
            &self,
            rect: Rect,
            pic_info: &str,
            delta_color: &str,
            sim: f64,
            dir: i32,
        ) -> Result<Option<Found>> {
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(pic_info).push(delta_color).push(sim).push(dir);
            push_outs(&mut args, 2);
            found_at(&self.invoke_method("FindPicMem", &args)?)
        }

        /// Integer similarity (0-100) variant.
        fn find_pic_sim(
            &self,
            rect: Rect,
            pic_name: &str,
            delta_color: &str,
            sim: i32,
            dir: i32,
        ) -> Result<Option<Found>> {
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(pic_name).push(delta_color).push(sim).push(dir);
            push_outs(&mut args, 2);
            found_at(&self.invoke_method("FindPicSim", &args)?)
        }

        fn find_pic_sim_mem(
            &self,
            rect: Rect,
            pic_info: &str,
            delta_color: &str,
            sim: i32,
            dir: i32,
        ) -> Result<Option<Found>> {
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(pic_info).push(delta_color).push(sim).push(dir);
            push_outs(&mut args, 2);
            found_at(&self.invoke_method("FindPicSimMem", &args)?)
        }

        fn find_multi_color(
            &self,
            rect: Rect,
            first_color: &str,
            offset_color: &str,
            sim: f64,
            dir: i32,
        ) -> Result<Option<Point>> {
            require_text("first_color", first_color)?;
            require_text("offset_color", offset_color)?;
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(first_color).push(offset_color).push(sim).push(dir);
            push_outs(&mut args, 2);
            point_if_found(&self.invoke_method("FindMultiColor", &args)?)
        }

        fn find_shape(
            &self,
            rect: Rect,
            offset_color: &str,
            sim: f64,
            dir: i32,
        ) -> Result<Option<Point>> {
            require_text("offset_color", offset_color)?;
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(offset_color).push(sim).push(dir);
            push_outs(&mut args, 2);
            point_if_found(&self.invoke_method("FindShape", &args)?)
        }

        /// A `width`x`height` block containing at least `count` matching pixels.
        fn find_color_block(
            &self,
            rect: Rect,
            color: &str,
            sim: f64,
            count: i32,
            block: Size,
        ) -> Result<Option<Point>> {
            require_text("color", color)?;
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            args.push(color).push(sim).push(count);
            block.push_args(&mut args)?;
            push_outs(&mut args, 2);
            point_if_found(&self.invoke_method("FindColorBlock", &args)?)
        }

        fn get_screen_data_bmp(&self, rect: Rect) -> Result<Option<ScreenBitmap>> {
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            push_outs(&mut args, 2);
            let result = self.invoke_method("GetScreenDataBmp", &args)?;
            if result.value::<i32>()? == 0 {
                return Ok(None);
            }
            Ok(Some(ScreenBitmap {
                data: i64::from(result.out::<i32>(0)?),
                size: result.out(1)?,
            }))
        }

        /// Load one or more `|`-separated pictures into the object's cache.
        fn load_pic(&self, pic_name: &str) -> Result<i32> {
            let status: i32 = self.call("LoadPic", ArgList::from_args(pic_name))?;
            if status != 0 {
                for key in picture_keys(pic_name) {
                    self.resources().register(ResourceKind::Picture, key);
                }
            }
            Ok(status)
        }

        /// Drop cached pictures. Only pictures loaded through `load_pic` are
        /// known here; ones the object loaded implicitly during a search are
        /// rejected as unknown. Wildcard entries are resolved by the object
        /// and mark every matching loaded picture freed.
        fn free_pic(&self, pic_name: &str) -> Result<i32> {
            let keys = picture_keys(pic_name);
            for key in &keys {
                self.resources().check_releasable(ResourceKind::Picture, key)?;
            }
            let status: i32 = self.call("FreePic", ArgList::from_args(pic_name))?;
            if status != 0 {
                for key in &keys {
                    self.resources().release(ResourceKind::Picture, key)?;
                }
                for pattern in picture_patterns(pic_name) {
                    self.resources()
                        .release_matching(ResourceKind::Picture, &pattern);
                }
            }
            Ok(status)
        }

        /// Snapshot `rect`; `None` when the object could not capture it.
        fn get_screen_data(&self, rect: Rect) -> Result<Option<ScreenDataHandle>> {
            let mut args = ArgList::new();
            rect.push_args(&mut args)?;
            let addr: i32 = self.call("GetScreenData", args)?;
            if addr == 0 {
                return Ok(None);
            }
            let handle = ScreenDataHandle(i64::from(addr));
            self.resources()
                .register(ResourceKind::ScreenData, ResourceKey::id(handle.0));
            Ok(Some(handle))
        }

        fn free_screen_data(&self, handle: ScreenDataHandle) -> Result<i32> {
            let key = ResourceKey::id(handle.0);
            self.resources().check_releasable(ResourceKind::ScreenData, &key)?;
            let mut args = ArgList::new();
            handle.push_args(&mut args)?;
            let status: i32 = self.call("FreeScreenData", args)?;
            if status != 0 {
                self.resources().release(ResourceKind::ScreenData, &key)?;
            }
            Ok(status)
        }
    }
}
