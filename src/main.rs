// 该文件是 Guanshan （关山）项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use ndarray::Array2;
use tracing::{info, warn};

use guanshan::labels::class_name;
use guanshan::record::RecordOutput;
use guanshan::{pipeline, utils};

/// 从 JSON 转储加载原始输出张量，格式为 (A, 5 + C) 的二维数组。
fn load_raw_output(path: &Path) -> Result<Array2<f32>> {
  let file = File::open(path).with_context(|| format!("无法打开转储文件: {}", path.display()))?;
  let rows: Vec<Vec<f32>> = serde_json::from_reader(BufReader::new(file))
    .with_context(|| format!("转储文件解析失败: {}", path.display()))?;

  ensure!(!rows.is_empty(), "转储文件不含任何锚点");
  let cols = rows[0].len();
  ensure!(cols >= 6, "每个锚点至少需要 6 个通道, 实际为 {}", cols);
  ensure!(
    rows.iter().all(|row| row.len() == cols),
    "各锚点的通道数不一致"
  );

  let data: Vec<f32> = rows.into_iter().flatten().collect();
  let total = data.len() / cols;
  Ok(Array2::from_shape_vec((total, cols), data)?)
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("转储文件: {}", args.raw_output.display());
  info!("网络输入尺寸: {}x{}", args.height, args.width);
  info!("置信度阈值: {}", args.score_threshold);
  info!("NMS 阈值: {}", args.nms_threshold);

  let mut raw = load_raw_output(&args.raw_output)?;
  utils::print_results([("raw_output", &raw)], false);

  let now = std::time::Instant::now();
  let result = pipeline::detect(
    &mut raw,
    (args.height, args.width),
    args.p6,
    args.nms_threshold,
    args.score_threshold,
  );
  info!("后处理完成，耗时: {:.2?}", now.elapsed());

  match result {
    None => warn!("没有检测到任何物体"),
    Some(result) => {
      info!("检测到 {} 个物体", result.len());
      for det in result.iter() {
        let [x1, y1, x2, y2] = det.bbox;
        info!(
          "  - {}: {:.2}% at ({:.0}, {:.0}, {:.0}, {:.0})",
          class_name(det.class_id),
          det.score * 100.0,
          x1,
          y1,
          x2,
          y2
        );
      }

      if let Some(directory) = &args.record {
        let output = RecordOutput::new(directory);
        output.record(&result)?;
      }
    }
  }

  Ok(())
}
