// 该文件是 Guanshan （关山）项目的一部分。
// src/utils.rs - 通用辅助函数
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

use std::path::Path;

use ndarray::{Array, Dimension};
use tracing::debug;

/// 确保目录存在，已存在时不报错。
pub fn mkdir<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
  let path = path.as_ref();
  if !path.exists() {
    std::fs::create_dir_all(path)?;
  }
  Ok(())
}

/// 打印各输出张量的名称与形状，`data` 为真时连同数据一起打印。
pub fn print_results<'a, D, I>(result: I, data: bool)
where
  D: Dimension + 'a,
  I: IntoIterator<Item = (&'a str, &'a Array<f32, D>)>,
{
  for (name, tensor) in result {
    debug!("{}: 形状 {:?}", name, tensor.shape());
    if data {
      debug!("{}: {:?}", name, tensor);
    }
  }
}
