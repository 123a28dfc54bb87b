//! Video Processing Utilities
//!
//! Provides ffmpeg filter generation for animated image → video encoding:
//! - Dimension correction for 4:2:0 chroma subsampling
//! - Aspect-preserving bounded scale filter

/// Round a dimension down to the nearest even value (minimum 2).
pub fn even_bound(value: u32) -> u32 {
    (value - value % 2).max(2)
}

pub fn ensure_even_dimensions(width: u32, height: u32) -> (u32, u32, bool) {
    let corrected_width = even_bound(width);
    let corrected_height = even_bound(height);
    let needs_correction = corrected_width != width || corrected_height != height;

    (corrected_width, corrected_height, needs_correction)
}

/// Scale filter that fits the frame inside `max_width`×`max_height`.
///
/// The side that is larger relative to its bound is set to that bound and
/// the other side follows the source aspect ratio (`-2` keeps it even).
/// No padding is added.
pub fn build_bounded_scale_filter(max_width: u32, max_height: u32) -> String {
    let (w, h, _) = ensure_even_dimensions(max_width, max_height);
    format!(
        "scale='if(gt(iw/{w},ih/{h}),{w},-2)':'if(gt(iw/{w},ih/{h}),-2,{h})':flags=lanczos",
        w = w,
        h = h
    )
}

/// Full `-vf` chain: frame-rate conversion, then bounded lanczos scale.
pub fn build_video_filter_chain(fps: u32, max_width: u32, max_height: u32) -> String {
    format!(
        "fps={},{}",
        fps,
        build_bounded_scale_filter(max_width, max_height)
    )
}
