//! 报告写入服务 - 业务能力层
//!
//! 只负责把流程结果落盘（HTML 报告、历史 JSON、摘要 JSON），不关心流程

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{HistoryLog, RunRecord, StructuredSummary};

/// 报告写入服务
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    /// 文件名后缀，批量运行时区分不同流程
    tag: Option<String>,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            tag: None,
        }
    }

    /// 为第 `run_index` 个流程创建写入器
    pub fn for_run(&self, run_index: usize) -> Self {
        Self {
            output_dir: self.output_dir.clone(),
            tag: Some(format!("run{}", run_index)),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 写出 HTML 格式的出题过程报告
    pub async fn write_html_report(&self, history: &HistoryLog) -> AppResult<PathBuf> {
        let path = self.file_path("mcq_development_history", "html");
        self.write(&path, render_html(history)).await?;
        info!("📄 HTML 报告已保存: {}", path.display());
        Ok(path)
    }

    /// 写出流程记录（JSON）
    pub async fn write_history_json(&self, records: &[RunRecord]) -> AppResult<PathBuf> {
        let path = self.file_path("mcq_development_records", "json");
        let content = serde_json::to_string_pretty(records)?;
        self.write(&path, content).await?;
        info!("🗂️ 流程记录已保存: {}", path.display());
        Ok(path)
    }

    /// 原样保存摘要 JSON，内容为空时不写文件
    pub async fn save_json_summary(&self, payload: &str) -> AppResult<Option<PathBuf>> {
        if payload.trim().is_empty() {
            debug!("摘要为空，跳过保存");
            return Ok(None);
        }

        let path = self.file_path("mcq_versions_summary", "json");
        self.write(&path, payload.to_string()).await?;
        info!("📋 JSON 摘要已保存: {}", path.display());
        Ok(Some(path))
    }

    /// 保存不经模型、直接从历史中取出的摘要
    ///
    /// 文件名带 `local`，与模型抽取的摘要区分开
    pub async fn save_local_summary(&self, summary: &StructuredSummary) -> AppResult<PathBuf> {
        let path = self.file_path("mcq_versions_summary_local", "json");
        let content = serde_json::to_string_pretty(summary)?;
        self.write(&path, content).await?;
        info!("📋 本地摘要已保存: {}", path.display());
        Ok(path)
    }

    fn file_path(&self, prefix: &str, extension: &str) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let file_name = match &self.tag {
            Some(tag) => format!("{}_{}_{}.{}", prefix, timestamp, tag, extension),
            None => format!("{}_{}.{}", prefix, timestamp, extension),
        };
        self.output_dir.join(file_name)
    }

    async fn write(&self, path: &Path, content: String) -> AppResult<()> {
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::file_write_failed(self.output_dir.display().to_string(), e))?;
        fs::write(path, content)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))
    }
}

/// 渲染 HTML 报告
pub fn render_html(history: &HistoryLog) -> String {
    let mut html = String::from(
        r#"<html>
<head>
<meta charset="utf-8">
<style>
body { font-family: Arial, sans-serif; margin: 40px; }
.entry { margin-bottom: 30px; border-bottom: 1px solid #ccc; padding-bottom: 20px; }
.timestamp { color: #666; font-size: 0.9em; }
.role { font-weight: bold; color: #2c5282; }
.version { color: #718096; }
.content { margin-top: 10px; white-space: pre-wrap; }
.header { background-color: #f7fafc; padding: 20px; margin-bottom: 30px; }
</style>
</head>
<body>
"#,
    );

    html.push_str(&format!(
        r#"<div class="header">
    <h1>USMLE MCQ Development Process Record</h1>
    <p>Generated on: {}</p>
</div>
"#,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));

    for entry in history.entries() {
        html.push_str(&format!(
            r#"<div class="entry">
    <div class="timestamp">{}</div>
    <div class="role">
        <span class="role">{}</span>
        <span class="version">(Version {})</span>
    </div>
    <div class="content">{}</div>
</div>
"#,
            escape_html(&entry.timestamp),
            escape_html(&entry.role),
            entry.version,
            escape_html(&entry.content)
        ));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
