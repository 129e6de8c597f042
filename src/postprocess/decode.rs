// 该文件是 Guanshan （关山）项目的一部分。
// src/postprocess/decode.rs - 锚点网格解码
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

use ndarray::{Array1, Array2, ArrayView2, ArrayViewMut2};
use tracing::debug;

/// 标准检测头步长
const STRIDES: [usize; 3] = [8, 16, 32];
/// 启用 P6 检测头时的步长
const STRIDES_P6: [usize; 4] = [8, 16, 32, 64];

/// 生成各检测头的网格单元坐标与步长表。
///
/// 返回 `(cells, strides)`：`cells` 为 `(A, 2)` 的单元坐标，`strides` 为
/// 长度 `A` 的步长数组，`A` 为全部检测头的锚点总数。
///
/// 单元的枚举顺序是与模型原始输出之间的位置约定：各检测头按步长升序
/// 拼接，头内外层遍历 `W/stride`、内层遍历 `H/stride`，单元坐标取
/// `(内层下标, 外层下标)`。该顺序中高宽角色的互换复刻了参考实现的
/// meshgrid 行为，调换顺序会使所有解码框整体偏移。
pub fn grid_strides(img_size: (usize, usize), p6: bool) -> (Array2<f32>, Array1<f32>) {
  let strides: &[usize] = if p6 { &STRIDES_P6 } else { &STRIDES };
  let (height, width) = img_size;

  let mut cells = Vec::new();
  let mut expanded = Vec::new();
  for &stride in strides {
    let hsize = height / stride;
    let wsize = width / stride;
    for outer in 0..wsize {
      for inner in 0..hsize {
        cells.push(inner as f32);
        cells.push(outer as f32);
        expanded.push(stride as f32);
      }
    }
  }

  let total = expanded.len();
  debug!("锚点网格生成完成: {} 个锚点, 步长 {:?}", total, strides);

  let cells = Array2::from_shape_vec((total, 2), cells).expect("网格元素数量与形状不一致");
  (cells, Array1::from_vec(expanded))
}

/// 就地解码模型原始输出。
///
/// `outputs` 形状为 `(A, 4 + C)`，前 4 个通道为原始回归量，其余通道为
/// 置信度，保持不变。解码后前 4 个通道为绝对像素下的
/// `(center_x, center_y, width, height)`，注意不是角点格式，
/// 喂给 NMS 之前需经 [`cxcywh_to_xyxy`] 转换。
///
/// `img_size` 为网络输入分辨率 `(H, W)`，不是原始图像尺寸。锚点总数
/// 必须等于各步长 `(H/s)*(W/s)` 之和；不做校验，行数不足时索引直接
/// panic，属调用方的编程错误。
pub fn decode_outputs(mut outputs: ArrayViewMut2<'_, f32>, img_size: (usize, usize), p6: bool) {
  let (cells, strides) = grid_strides(img_size, p6);

  for i in 0..strides.len() {
    let stride = strides[i];
    outputs[[i, 0]] = (outputs[[i, 0]] + cells[[i, 0]]) * stride;
    outputs[[i, 1]] = (outputs[[i, 1]] + cells[[i, 1]]) * stride;
    outputs[[i, 2]] = outputs[[i, 2]].exp() * stride;
    outputs[[i, 3]] = outputs[[i, 3]].exp() * stride;
  }
}

/// 将 `(cx, cy, w, h)` 格式的框转换为 `(x1, y1, x2, y2)` 角点格式。
pub fn cxcywh_to_xyxy(boxes: ArrayView2<'_, f32>) -> Array2<f32> {
  let n = boxes.nrows();
  let mut corners = Array2::zeros((n, 4));
  for i in 0..n {
    let (cx, cy, w, h) = (
      boxes[[i, 0]],
      boxes[[i, 1]],
      boxes[[i, 2]],
      boxes[[i, 3]],
    );
    corners[[i, 0]] = cx - w / 2.0;
    corners[[i, 1]] = cy - h / 2.0;
    corners[[i, 2]] = cx + w / 2.0;
    corners[[i, 3]] = cy + h / 2.0;
  }
  corners
}
