// src/frame.rs

use crate::config::PixelFormat;
use crate::error::{Result, VqError};

pub const PLANE_COUNT: usize = 3;

/// Bytes needed to hold one sample at the given bit depth.
pub fn bytes_per_sample(bit_depth: u32) -> usize {
    ((bit_depth + 7) >> 3) as usize
}

/// Chroma plane width for a given luma width. Odd luma dimensions round up.
/// `Unknown` degenerates to 0 and must have been rejected by config
/// validation before this is ever consulted for packing.
pub fn chroma_width(luma_width: u32, format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Yuv444p => luma_width,
        PixelFormat::Yuv420p | PixelFormat::Yuv422p => (luma_width + 1) >> 1,
        PixelFormat::Unknown => 0,
    }
}

/// Chroma plane height for a given luma height. Same rounding rule as
/// [`chroma_width`]; only 4:2:0 subsamples vertically.
pub fn chroma_height(luma_height: u32, format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Yuv444p | PixelFormat::Yuv422p => luma_height,
        PixelFormat::Yuv420p => (luma_height + 1) >> 1,
        PixelFormat::Unknown => 0,
    }
}

/// Dimensions of one plane in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneDims {
    pub width: u32,
    pub height: u32,
}

impl PlaneDims {
    /// Packed (unpadded) byte count of one row.
    pub fn row_bytes(&self, bit_depth: u32) -> usize {
        self.width as usize * bytes_per_sample(bit_depth)
    }
}

/// Plane geometry in index order: 0 = luma, 1 = chroma-b, 2 = chroma-r.
pub fn plane_dimensions(format: PixelFormat, width: u32, height: u32) -> [PlaneDims; PLANE_COUNT] {
    let luma = PlaneDims { width, height };
    let chroma = PlaneDims {
        width: chroma_width(width, format),
        height: chroma_height(height, format),
    };
    [luma, chroma, chroma]
}

/// Total byte size of one tightly packed frame (the caller-buffer contract:
/// source row stride equals plane width x bytes-per-sample, no padding).
pub fn packed_frame_size(format: PixelFormat, bit_depth: u32, width: u32, height: u32) -> usize {
    plane_dimensions(format, width, height)
        .iter()
        .map(|d| d.row_bytes(bit_depth) * d.height as usize)
        .sum()
}

/// One plane of an engine-owned buffer. `stride` may exceed `row_bytes`
/// (engine padding); the gap bytes are never read by the packer.
#[derive(Debug)]
pub struct BufferPlane {
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub row_bytes: usize,
    data: Vec<u8>,
}

impl BufferPlane {
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.stride]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        &mut self.data[start..start + self.stride]
    }
}

/// Engine-owned planar pixel buffer that frame data is packed into.
///
/// Allocated by the scoring engine (see
/// [`ScoringEngine::allocate_picture`](crate::engine::ScoringEngine::allocate_picture));
/// ownership passes back to the engine on submission.
#[derive(Debug)]
pub struct PlanarBuffer {
    pub bit_depth: u32,
    planes: [BufferPlane; PLANE_COUNT],
}

impl PlanarBuffer {
    /// Allocates a zeroed buffer whose per-plane strides are rounded up to
    /// `align` bytes. `align = 1` gives packed strides.
    pub fn with_alignment(
        format: PixelFormat,
        bit_depth: u32,
        width: u32,
        height: u32,
        align: usize,
    ) -> PlanarBuffer {
        let align = align.max(1);
        let planes = plane_dimensions(format, width, height).map(|d| {
            let row_bytes = d.row_bytes(bit_depth);
            let stride = row_bytes.div_ceil(align) * align;
            BufferPlane {
                width: d.width,
                height: d.height,
                stride,
                row_bytes,
                data: vec![0u8; stride * d.height as usize],
            }
        });
        PlanarBuffer { bit_depth, planes }
    }

    pub fn plane(&self, index: usize) -> &BufferPlane {
        &self.planes[index]
    }

    pub fn plane_mut(&mut self, index: usize) -> &mut BufferPlane {
        &mut self.planes[index]
    }

    /// Packed byte size this buffer expects from a tightly packed source.
    pub fn packed_size(&self) -> usize {
        self.planes
            .iter()
            .map(|p| p.row_bytes * p.height as usize)
            .sum()
    }
}

/// Copies one tightly packed source frame into an engine buffer, row by row.
///
/// Exactly `row_bytes` are copied per row; the destination stride may be
/// padded. The source must be packed with no inter-row padding; this is
/// the critical correctness boundary of the whole pipeline, so the total
/// size is checked before any copy happens.
pub fn pack_frame(dst: &mut PlanarBuffer, src: &[u8]) -> Result<()> {
    let need = dst.packed_size();
    if src.len() < need {
        return Err(VqError::SourceTooSmall {
            need,
            have: src.len(),
        });
    }

    let mut offset = 0;
    for plane in &mut dst.planes {
        for y in 0..plane.height {
            let row_bytes = plane.row_bytes;
            plane.row_mut(y)[..row_bytes].copy_from_slice(&src[offset..offset + row_bytes]);
            offset += row_bytes;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chroma_geometry_444() {
        assert_eq!(chroma_width(1920, PixelFormat::Yuv444p), 1920);
        assert_eq!(chroma_height(1080, PixelFormat::Yuv444p), 1080);
    }

    #[test]
    fn chroma_geometry_422_rounds_width_up() {
        assert_eq!(chroma_width(1919, PixelFormat::Yuv422p), 960);
        assert_eq!(chroma_width(1920, PixelFormat::Yuv422p), 960);
        assert_eq!(chroma_height(1081, PixelFormat::Yuv422p), 1081);
    }

    #[test]
    fn chroma_geometry_420_rounds_both_up() {
        assert_eq!(chroma_width(3, PixelFormat::Yuv420p), 2);
        assert_eq!(chroma_height(3, PixelFormat::Yuv420p), 2);
        assert_eq!(chroma_width(4, PixelFormat::Yuv420p), 2);
        assert_eq!(chroma_height(4, PixelFormat::Yuv420p), 2);
    }

    #[test]
    fn unknown_format_degenerates_to_zero_chroma() {
        assert_eq!(chroma_width(1920, PixelFormat::Unknown), 0);
        assert_eq!(chroma_height(1080, PixelFormat::Unknown), 0);
    }

    #[test]
    fn packed_size_2x2_444_8bit() {
        // three 2x2 planes, one byte per sample
        assert_eq!(packed_frame_size(PixelFormat::Yuv444p, 8, 2, 2), 12);
    }

    #[test]
    fn packed_size_odd_420_10bit() {
        // luma 3x3 @ 2 bytes = 18, chroma 2x2 @ 2 bytes = 8 each
        assert_eq!(packed_frame_size(PixelFormat::Yuv420p, 10, 3, 3), 34);
    }

    #[test]
    fn pack_copies_rows_into_padded_strides() {
        let src: Vec<u8> = (0u8..12).collect();
        let mut dst = PlanarBuffer::with_alignment(PixelFormat::Yuv444p, 8, 2, 2, 16);
        pack_frame(&mut dst, &src).unwrap();

        let mut expected = 0u8;
        for p in 0..PLANE_COUNT {
            let plane = dst.plane(p);
            assert_eq!(plane.stride, 16);
            assert_eq!(plane.row_bytes, 2);
            for y in 0..plane.height {
                let row = plane.row(y);
                assert_eq!(row[0], expected);
                assert_eq!(row[1], expected + 1);
                // padding stays zeroed
                assert!(row[2..].iter().all(|&b| b == 0));
                expected += 2;
            }
        }
    }

    #[test]
    fn pack_rejects_undersized_source() {
        let mut dst = PlanarBuffer::with_alignment(PixelFormat::Yuv444p, 8, 2, 2, 1);
        let err = pack_frame(&mut dst, &[0u8; 11]).unwrap_err();
        assert!(matches!(
            err,
            VqError::SourceTooSmall { need: 12, have: 11 }
        ));
    }

    #[test]
    fn pack_accepts_oversized_source() {
        let mut dst = PlanarBuffer::with_alignment(PixelFormat::Yuv444p, 8, 2, 2, 1);
        assert!(pack_frame(&mut dst, &[7u8; 64]).is_ok());
    }

    #[test]
    fn ten_bit_samples_are_two_bytes() {
        assert_eq!(bytes_per_sample(8), 1);
        assert_eq!(bytes_per_sample(10), 2);
        assert_eq!(bytes_per_sample(12), 2);
        assert_eq!(bytes_per_sample(16), 2);
    }
}
