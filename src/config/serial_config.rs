//! 串口连接配置
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    #[serde(with = "humantime_serde")] // 单次读取超时
    pub read_timeout: Duration,
    #[serde(with = "humantime_serde")] // 烧录前清空缓冲区的时间窗口
    pub drain_window: Duration,
    #[serde(with = "humantime_serde")] // 等待 start/end 横幅的总时限
    pub capture_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::from("/dev/ttyACM0"),
            baud_rate: 115_200,
            read_timeout: Duration::from_millis(100),
            drain_window: Duration::from_millis(200),
            capture_timeout: Duration::from_secs(30),
        }
    }
}
