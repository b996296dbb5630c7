/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 待校验数据集（JSON 数组或单个对象）
    pub input_json: String,
    /// 校验结果输出文件
    pub output_json: String,
    /// 每批处理的记录数量
    pub batch_size: usize,
    /// 批内最大并发数
    pub max_workers: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_json: "dataset.json".to_string(),
            output_json: "corrected.json".to_string(),
            batch_size: 5,
            max_workers: 5,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4.1".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_json: std::env::var("INPUT_JSON").unwrap_or(default.input_json),
            output_json: std::env::var("OUTPUT_JSON").unwrap_or(default.output_json),
            batch_size: std::env::var("BATCH_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.batch_size),
            max_workers: std::env::var("MAX_WORKERS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_workers),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        }
    }
}
