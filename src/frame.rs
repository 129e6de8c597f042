// 该文件是 Guanshan （关山）项目的一部分。
// src/frame.rs - 平面帧与信箱式缩放
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Guanshan Contributors

use image::{ImageBuffer, Rgb, RgbImage, imageops::FilterType};

const RGB_CHANNELS: usize = 3;

/// 信箱式缩放的画布填充值，每个通道相同
pub const PAD_VALUE: u8 = 114;

/// 通道优先（CHW）布局的帧数据
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarFrame {
  data: Box<[u8]>,
  width: usize,
  height: usize,
}

impl PlanarFrame {
  pub fn width(&self) -> usize {
    self.width
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  /// CHW 布局的字节数据
  pub fn as_planar(&self) -> &[u8] {
    &self.data
  }

  pub fn into_data(self) -> Box<[u8]> {
    self.data
  }
}

impl AsRef<[u8]> for PlanarFrame {
  fn as_ref(&self) -> &[u8] {
    &self.data
  }
}

/// 将 HWC 图像转换为网络输入要求的 CHW 平面布局，必要时做信箱式缩放。
///
/// `input_size` 为 `(H, W)`。为 `None` 或与源尺寸一致时只做布局转置，
/// 不缩放、不填充。否则按 `r = min(H'/H, W'/W)` 保持纵横比缩放
/// （双线性插值），以整数下取整偏移 `(目标 - 缩放后) / 2` 居中粘贴到
/// 填充值为 114 的画布上，再转置。
pub fn to_planar(image: &RgbImage, input_size: Option<(u32, u32)>) -> PlanarFrame {
  let (src_w, src_h) = image.dimensions();

  let Some((dst_h, dst_w)) = input_size else {
    return transpose(image);
  };
  if (dst_h, dst_w) == (src_h, src_w) {
    return transpose(image);
  }

  let r = (dst_h as f32 / src_h as f32).min(dst_w as f32 / src_w as f32);
  // 向零取整，与参考实现的整型转换一致
  let resized_h = (src_h as f32 * r) as u32;
  let resized_w = (src_w as f32 * r) as u32;
  let resized = image::imageops::resize(image, resized_w, resized_h, FilterType::Triangle);

  let pad_y = (dst_h - resized_h) / 2;
  let pad_x = (dst_w - resized_w) / 2;

  let mut canvas: RgbImage = ImageBuffer::from_pixel(dst_w, dst_h, Rgb([PAD_VALUE; 3]));
  image::imageops::replace(&mut canvas, &resized, pad_x as i64, pad_y as i64);

  transpose(&canvas)
}

/// HWC 到 CHW 的布局转置
fn transpose(image: &RgbImage) -> PlanarFrame {
  let (width, height) = image.dimensions();
  let plane = width as usize * height as usize;
  let mut data = vec![0u8; RGB_CHANNELS * plane];

  for (x, y, pixel) in image.enumerate_pixels() {
    let index = y as usize * width as usize + x as usize;
    for c in 0..RGB_CHANNELS {
      data[c * plane + index] = pixel[c];
    }
  }

  PlanarFrame {
    data: data.into_boxed_slice(),
    width: width as usize,
    height: height as usize,
  }
}
