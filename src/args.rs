// 该文件是 Guanshan （关山）项目的一部分。
// src/args.rs - 项目参数配置
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

use std::path::PathBuf;

use clap::Parser;

/// Guanshan 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型原始输出转储文件（JSON，形状 (A, 5 + C) 的二维数组）
  #[arg(long, value_name = "FILE")]
  pub raw_output: PathBuf,

  /// 网络输入高度
  #[arg(long, default_value = "640", value_name = "PIXELS")]
  pub height: usize,

  /// 网络输入宽度
  #[arg(long, default_value = "640", value_name = "PIXELS")]
  pub width: usize,

  /// 启用步长 64 的 P6 检测头
  #[arg(long)]
  pub p6: bool,

  /// NMS IOU 阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.45", value_name = "THRESHOLD")]
  pub nms_threshold: f32,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.3", value_name = "THRESHOLD")]
  pub score_threshold: f32,

  /// 检测结果记录目录（可选）
  #[arg(long, value_name = "DIR")]
  pub record: Option<PathBuf>,
}
