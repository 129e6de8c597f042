// 该文件是 Guanshan （关山）项目的一部分。
// src/device.rs - 设备输入队列边界
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

use image::RgbImage;
use tracing::debug;

use crate::frame::to_planar;

/// 设备帧的像素格式标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
  /// RGB，通道平面排列
  Rgb888Planar,
  /// BGR，通道平面排列
  Bgr888Planar,
}

/// 发往设备输入队列的一帧，固定尺寸、通道优先的字节缓冲
#[derive(Debug, Clone)]
pub struct ImgFrame {
  pub format: PixelFormat,
  pub width: u32,
  pub height: u32,
  pub data: Box<[u8]>,
}

/// 设备输入队列。实现方负责实际的帧传输，发送不阻塞等待完成。
pub trait FrameQueue {
  type Error;

  fn send(&self, frame: ImgFrame) -> Result<(), Self::Error>;
}

impl FrameQueue for std::sync::mpsc::Sender<ImgFrame> {
  type Error = std::sync::mpsc::SendError<ImgFrame>;

  fn send(&self, frame: ImgFrame) -> Result<(), Self::Error> {
    std::sync::mpsc::Sender::send(self, frame)
  }
}

/// 将图像信箱式缩放到网络输入尺寸并送入设备输入队列。
///
/// 只负责打包发送，不等待设备处理完成。
pub fn run_nn<Q: FrameQueue>(
  image: &RgbImage,
  queue: &Q,
  width: u32,
  height: u32,
) -> Result<(), Q::Error> {
  let frame = to_planar(image, Some((height, width)));
  debug!("发送 {}x{} 平面帧到设备输入队列", width, height);

  queue.send(ImgFrame {
    format: PixelFormat::Rgb888Planar,
    width,
    height,
    data: frame.into_data(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{ImageBuffer, Rgb};

  #[test]
  fn test_run_nn_sends_planar_frame() {
    let image: RgbImage = ImageBuffer::from_pixel(16, 8, Rgb([1, 2, 3]));
    let (tx, rx) = std::sync::mpsc::channel();

    run_nn(&image, &tx, 32, 32).unwrap();

    let frame = rx.try_recv().unwrap();
    assert_eq!(frame.format, PixelFormat::Rgb888Planar);
    assert_eq!(frame.width, 32);
    assert_eq!(frame.height, 32);
    assert_eq!(frame.data.len(), 3 * 32 * 32);
  }

  #[test]
  fn test_send_fails_after_receiver_dropped() {
    let image: RgbImage = ImageBuffer::from_pixel(4, 4, Rgb([0, 0, 0]));
    let (tx, rx) = std::sync::mpsc::channel::<ImgFrame>();
    drop(rx);

    assert!(run_nn(&image, &tx, 4, 4).is_err());
  }
}
