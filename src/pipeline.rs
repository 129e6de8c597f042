// 该文件是 Guanshan （关山）项目的一部分。
// src/pipeline.rs - 检测流水线
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

use ndarray::{Array2, Axis, s};
use tracing::debug;

use crate::postprocess::{DetectResult, cxcywh_to_xyxy, decode_outputs, multiclass_nms};

/// 完整的检测后处理流水线：解码、折叠置信度、角点转换、多类别 NMS。
///
/// `raw` 形状为 `(A, 5 + C)`：通道 0..4 为原始回归量，通道 4 为目标
/// 置信度，通道 5.. 为各类别概率。每类分数取目标置信度与类别概率的
/// 乘积。解码会就地改写 `raw` 的几何通道，调用后不能再当作未解码的
/// 原始张量使用。
///
/// 返回 `None` 表示整帧没有任何检测，与有检测的结果显式区分。
pub fn detect(
  raw: &mut Array2<f32>,
  img_size: (usize, usize),
  p6: bool,
  nms_thr: f32,
  score_thr: f32,
) -> Option<DetectResult> {
  decode_outputs(raw.view_mut(), img_size, p6);

  let boxes = cxcywh_to_xyxy(raw.slice(s![.., 0..4]));
  let objectness = raw.slice(s![.., 4]).insert_axis(Axis(1));
  let scores = &raw.slice(s![.., 5..]) * &objectness;

  let detections = multiclass_nms(boxes.view(), scores.view(), nms_thr, score_thr)?;
  debug!("检测到 {} 个物体", detections.len());

  Some(DetectResult::from(detections))
}

#[cfg(test)]
mod tests {
  use super::*;
  use ndarray::Array2;

  const IMG_SIZE: (usize, usize) = (64, 64);

  fn anchor_total() -> usize {
    [8usize, 16, 32]
      .iter()
      .map(|s| (IMG_SIZE.0 / s) * (IMG_SIZE.1 / s))
      .sum()
  }

  #[test]
  fn test_detect_no_detections() {
    // 全零张量: 所有分数为 0，不超过阈值
    let mut raw = Array2::<f32>::zeros((anchor_total(), 7));
    assert!(detect(&mut raw, IMG_SIZE, false, 0.45, 0.3).is_none());
  }

  #[test]
  fn test_detect_end_to_end() {
    let mut raw = Array2::<f32>::zeros((anchor_total(), 7));

    // 锚点 0: 步长 8 头的单元 (0, 0)，类别 0
    raw[[0, 0]] = 0.5;
    raw[[0, 1]] = 0.5;
    raw[[0, 4]] = 0.9;
    raw[[0, 5]] = 0.8;

    // 锚点 36: 步长 8 头的单元 (4, 4)，类别 1
    raw[[36, 0]] = 0.5;
    raw[[36, 1]] = 0.5;
    raw[[36, 4]] = 0.9;
    raw[[36, 6]] = 0.9;

    let result = detect(&mut raw, IMG_SIZE, false, 0.45, 0.3).unwrap();
    assert_eq!(result.len(), 2);

    // 类别升序
    let det0 = &result.items[0];
    assert_eq!(det0.class_id, 0);
    assert!((det0.score - 0.72).abs() < 1e-5);
    // 中心 (4, 4)，宽高 exp(0) * 8 = 8 -> 角点 (0, 0, 8, 8)
    assert_eq!(det0.bbox, [0.0, 0.0, 8.0, 8.0]);

    let det1 = &result.items[1];
    assert_eq!(det1.class_id, 1);
    // 单元 (4, 4): 中心 (36, 36) -> 角点 (32, 32, 40, 40)
    assert_eq!(det1.bbox, [32.0, 32.0, 40.0, 40.0]);
  }

  #[test]
  fn test_detect_scores_are_product() {
    let mut raw = Array2::<f32>::zeros((anchor_total(), 6));
    raw[[0, 4]] = 0.5;
    raw[[0, 5]] = 0.5;

    // 0.5 * 0.5 = 0.25，不超过 0.3 阈值
    assert!(detect(&mut raw, IMG_SIZE, false, 0.45, 0.3).is_none());

    let mut raw = Array2::<f32>::zeros((anchor_total(), 6));
    raw[[0, 4]] = 0.8;
    raw[[0, 5]] = 0.5;
    let result = detect(&mut raw, IMG_SIZE, false, 0.45, 0.3).unwrap();
    assert_eq!(result.len(), 1);
    assert!((result.items[0].score - 0.4).abs() < 1e-6);
  }
}
