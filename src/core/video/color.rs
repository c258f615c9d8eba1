//! 8-bit BT.601 颜色转换（与解码器的 BGR2GRAY / BGR2YCrCb 一致）

const KR: f32 = 0.299;
const KG: f32 = 0.587;
const KB: f32 = 0.114;

const CR_SCALE: f32 = 0.713;
const CB_SCALE: f32 = 0.564;
const CHROMA_OFFSET: f32 = 128.0;

#[inline]
fn saturate(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// 灰度值（luma）
#[inline]
pub fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
    saturate(r as f32 * KR + g as f32 * KG + b as f32 * KB)
}

/// Returns `(luma, chroma_red, chroma_blue)`.
#[inline]
pub fn rgb_to_ycrcb(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let y = rgb_to_luma(r, g, b);
    let yf = y as f32;
    let cr = saturate((r as f32 - yf) * CR_SCALE + CHROMA_OFFSET);
    let cb = saturate((b as f32 - yf) * CB_SCALE + CHROMA_OFFSET);
    (y, cr, cb)
}

/// 连续亮度（不取整），用于区域平均色的对比度计算
#[inline]
pub fn relative_luminance(r: f64, g: f64, b: f64) -> f64 {
    0.299 * r + 0.587 * g + 0.114 * b
}
