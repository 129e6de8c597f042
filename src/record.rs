// 该文件是 Guanshan （关山）项目的一部分。
// src/record.rs - 目录记录输出
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

use std::fs::File;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{Datelike, Utc};
use thiserror::Error;
use tracing::info;

use crate::postprocess::DetectResult;
use crate::utils::mkdir;

#[derive(Error, Debug)]
pub enum RecordError {
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  Json(#[from] serde_json::Error),
}

/// 按日期归档检测结果的目录记录器。
///
/// 结果写入 `<目录>/<年>/<月>/<日>/<时-分-秒>-<帧号>.json`，
/// 中间目录按需创建。
pub struct RecordOutput {
  directory: PathBuf,
  frame_counter: Arc<Mutex<u16>>,
}

impl RecordOutput {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    RecordOutput {
      directory: directory.into(),
      frame_counter: Arc::new(Mutex::new(0)),
    }
  }

  fn frame_id(&self) -> u16 {
    let mut counter = self.frame_counter.lock().unwrap();
    let id = counter.wrapping_add(1);
    *counter = id;
    id
  }

  fn frame_path(&self) -> Result<PathBuf, RecordError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    mkdir(&directory)?;

    Ok(directory.join(format!(
      "{}-{:04X}.json",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }

  /// 记录一帧检测结果，返回写入的文件路径。
  pub fn record(&self, result: &DetectResult) -> Result<PathBuf, RecordError> {
    let path = self.frame_path()?;
    let file = File::create(&path)?;
    serde_json::to_writer_pretty(file, &result.items)?;
    info!("检测结果已记录到 {}", path.display());
    Ok(path)
  }
}
