// 该文件是 Guanshan （关山）项目的一部分。
// src/postprocess.rs - 检测后处理模块
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

use serde::{Deserialize, Serialize};

mod decode;
mod nms;

pub use self::decode::{cxcywh_to_xyxy, decode_outputs, grid_strides};
pub use self::nms::{multiclass_nms, nms};

/// 单个检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
  /// 边界框，[x_min, y_min, x_max, y_max]，绝对像素坐标
  pub bbox: [f32; 4],
  /// 置信度
  pub score: f32,
  /// 类别索引
  pub class_id: u32,
}

/// 一帧的全部检测结果
#[derive(Debug, Clone, Default)]
pub struct DetectResult {
  pub items: Box<[Detection]>,
}

impl DetectResult {
  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
    self.items.iter()
  }
}

impl From<Vec<Detection>> for DetectResult {
  fn from(items: Vec<Detection>) -> Self {
    DetectResult {
      items: items.into_boxed_slice(),
    }
  }
}
