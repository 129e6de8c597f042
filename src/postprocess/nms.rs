// 该文件是 Guanshan （关山）项目的一部分。
// src/postprocess/nms.rs - 非极大值抑制
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

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use tracing::debug;

use crate::postprocess::Detection;

/// 单类别贪心非极大值抑制。
///
/// `boxes` 形状为 `(N, 4)`，角点格式 `(x1, y1, x2, y2)`，绝对像素坐标；
/// `scores` 长度为 `N`。返回保留框在原始数组中的下标，按选取顺序
/// （分数降序淘汰顺序）排列，不是原始下标顺序。
///
/// 面积采用含端点的像素计数约定 `(x2 - x1 + 1) * (y2 - y1 + 1)`，
/// 交叠宽高同样带 +1 并钳制到非负。坐标完全相同的退化框面积为 1
/// 而不是 0，任何一对框的 IoU 计算都不会除零。
///
/// 排序为稳定降序，分数相同时按原始下标升序选取。
pub fn nms(boxes: ArrayView2<'_, f32>, scores: ArrayView1<'_, f32>, nms_thr: f32) -> Vec<usize> {
  let n = boxes.nrows();
  if n == 0 {
    return Vec::new();
  }

  let areas: Vec<f32> = (0..n)
    .map(|i| (boxes[[i, 2]] - boxes[[i, 0]] + 1.0) * (boxes[[i, 3]] - boxes[[i, 1]] + 1.0))
    .collect();

  let mut order: Vec<usize> = (0..n).collect();
  order.sort_by(|&a, &b| {
    scores[b]
      .partial_cmp(&scores[a])
      .unwrap_or(std::cmp::Ordering::Equal)
  });

  let mut keep = Vec::new();
  let mut suppressed = vec![false; n];
  for pos in 0..n {
    let i = order[pos];
    if suppressed[i] {
      continue;
    }
    keep.push(i);

    for &j in &order[pos + 1..] {
      if suppressed[j] {
        continue;
      }
      let xx1 = boxes[[i, 0]].max(boxes[[j, 0]]);
      let yy1 = boxes[[i, 1]].max(boxes[[j, 1]]);
      let xx2 = boxes[[i, 2]].min(boxes[[j, 2]]);
      let yy2 = boxes[[i, 3]].min(boxes[[j, 3]]);

      let width = (xx2 - xx1 + 1.0).max(0.0);
      let height = (yy2 - yy1 + 1.0).max(0.0);
      let inter = width * height;
      let overlap = inter / (areas[i] + areas[j] - inter);
      if overlap > nms_thr {
        suppressed[j] = true;
      }
    }
  }

  keep
}

/// 多类别非极大值抑制。
///
/// `boxes` 形状为 `(N, 4)` 角点格式，`scores` 形状为 `(N, C)`，
/// 每类独立进行：先按 `score_thr` 过滤（严格大于，阈值边界上的
/// 候选不保留），无候选的类别整体跳过，其余在类内做单类 NMS。
///
/// 各类结果按类别升序拼接，类内按淘汰顺序排列，不做全局重排。
/// 所有类别都没有产出时返回 `None`，与"有产出但为空"显式区分，
/// `Some(vec![])` 不会出现。
pub fn multiclass_nms(
  boxes: ArrayView2<'_, f32>,
  scores: ArrayView2<'_, f32>,
  nms_thr: f32,
  score_thr: f32,
) -> Option<Vec<Detection>> {
  let num_classes = scores.ncols();
  let mut final_dets = Vec::new();

  for cls in 0..num_classes {
    let cls_scores = scores.column(cls);
    let valid: Vec<usize> = (0..cls_scores.len())
      .filter(|&i| cls_scores[i] > score_thr)
      .collect();
    if valid.is_empty() {
      continue;
    }

    let mut valid_boxes = Array2::<f32>::zeros((valid.len(), 4));
    let mut valid_scores = Array1::<f32>::zeros(valid.len());
    for (k, &i) in valid.iter().enumerate() {
      valid_boxes.row_mut(k).assign(&boxes.row(i));
      valid_scores[k] = cls_scores[i];
    }

    let keep = nms(valid_boxes.view(), valid_scores.view(), nms_thr);
    debug!("类别 {}: {} 个候选, 保留 {} 个", cls, valid.len(), keep.len());

    for k in keep {
      final_dets.push(Detection {
        bbox: [
          valid_boxes[[k, 0]],
          valid_boxes[[k, 1]],
          valid_boxes[[k, 2]],
          valid_boxes[[k, 3]],
        ],
        score: valid_scores[k],
        class_id: cls as u32,
      });
    }
  }

  if final_dets.is_empty() {
    None
  } else {
    Some(final_dets)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use ndarray::{Array1, Array2, arr1, arr2};

  #[test]
  fn test_nms_overlapping_pair() {
    let boxes = arr2(&[
      [0.0, 0.0, 10.0, 10.0],
      [1.0, 1.0, 11.0, 11.0],
      [50.0, 50.0, 60.0, 60.0],
    ]);
    let scores = arr1(&[0.9, 0.8, 0.95]);

    let keep = nms(boxes.view(), scores.view(), 0.5);

    // 不重叠的高分框最先保留，重叠对中只有高分者存活
    assert_eq!(keep, vec![2, 0]);
  }

  #[test]
  fn test_nms_idempotent() {
    let boxes = arr2(&[
      [0.0, 0.0, 10.0, 10.0],
      [1.0, 1.0, 11.0, 11.0],
      [50.0, 50.0, 60.0, 60.0],
      [52.0, 52.0, 61.0, 61.0],
    ]);
    let scores = arr1(&[0.9, 0.8, 0.95, 0.6]);

    let keep = nms(boxes.view(), scores.view(), 0.5);

    let mut kept_boxes = Array2::<f32>::zeros((keep.len(), 4));
    let mut kept_scores = Array1::<f32>::zeros(keep.len());
    for (k, &i) in keep.iter().enumerate() {
      kept_boxes.row_mut(k).assign(&boxes.row(i));
      kept_scores[k] = scores[i];
    }

    // 幸存集合再做一遍 NMS 不会再淘汰任何框
    let again = nms(kept_boxes.view(), kept_scores.view(), 0.5);
    assert_eq!(again.len(), keep.len());
  }

  #[test]
  fn test_nms_empty_input() {
    let boxes = Array2::<f32>::zeros((0, 4));
    let scores = Array1::<f32>::zeros(0);
    assert!(nms(boxes.view(), scores.view(), 0.5).is_empty());
  }

  #[test]
  fn test_nms_degenerate_boxes() {
    // 零面积框按 +1 约定面积为 1，IoU 为 1 而不是 NaN
    let boxes = arr2(&[[0.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0]]);
    let scores = arr1(&[0.9, 0.8]);

    let keep = nms(boxes.view(), scores.view(), 0.5);
    assert_eq!(keep, vec![0]);
  }

  #[test]
  fn test_nms_tie_break_by_index() {
    let boxes = arr2(&[[0.0, 0.0, 5.0, 5.0], [100.0, 100.0, 105.0, 105.0]]);
    let scores = arr1(&[0.5, 0.5]);

    let keep = nms(boxes.view(), scores.view(), 0.5);
    assert_eq!(keep, vec![0, 1]);
  }

  #[test]
  fn test_multiclass_nms_no_detections() {
    let boxes = arr2(&[[0.0, 0.0, 10.0, 10.0]]);
    let scores = arr2(&[[0.9, 0.5]]);

    // 所有类别都被过滤时返回 None，而不是空集合
    assert!(multiclass_nms(boxes.view(), scores.view(), 0.5, 0.99).is_none());
  }

  #[test]
  fn test_multiclass_nms_strict_threshold() {
    let boxes = arr2(&[[0.0, 0.0, 10.0, 10.0]]);
    let scores = arr2(&[[0.5]]);

    // 严格大于: 分数恰好等于阈值的候选不保留
    assert!(multiclass_nms(boxes.view(), scores.view(), 0.5, 0.5).is_none());
    let dets = multiclass_nms(boxes.view(), scores.view(), 0.5, 0.49).unwrap();
    assert_eq!(dets.len(), 1);
  }

  #[test]
  fn test_multiclass_nms_class_order() {
    let boxes = arr2(&[[0.0, 0.0, 10.0, 10.0], [50.0, 50.0, 60.0, 60.0]]);
    // 框 0 属于类别 1，框 1 属于类别 0
    let scores = arr2(&[[0.1, 0.8], [0.7, 0.1]]);

    let dets = multiclass_nms(boxes.view(), scores.view(), 0.5, 0.5).unwrap();

    // 结果按类别升序拼接，不按全局分数排序
    assert_eq!(dets.len(), 2);
    assert_eq!(dets[0].class_id, 0);
    assert_eq!(dets[0].score, 0.7);
    assert_eq!(dets[1].class_id, 1);
    assert_eq!(dets[1].score, 0.8);
  }

  #[test]
  fn test_multiclass_nms_per_class_suppression() {
    // 同一位置的两个框分属不同类别时互不抑制
    let boxes = arr2(&[[0.0, 0.0, 10.0, 10.0], [0.0, 0.0, 10.0, 10.0]]);
    let scores = arr2(&[[0.9, 0.0], [0.0, 0.8]]);

    let dets = multiclass_nms(boxes.view(), scores.view(), 0.5, 0.3).unwrap();
    assert_eq!(dets.len(), 2);
  }
}
