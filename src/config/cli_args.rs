use clap::Parser;
use std::path::PathBuf;

// aeagle - 部署、烧录并采集嵌入式分配器测试
#[derive(Parser, Debug, Default)]
#[clap(
    name = "aeagle",
    version,
    about = "Deploy, flash, and capture allocator tests on embedded targets",
    override_usage = "aeagle [OPTIONS] { --os <SUITE> | --test <TEST> }\n       aeagle --os <SUITE> --test <TEST> [OPTIONS]\n       aeagle --list",
    after_help = "SELECTION:\n  --os <SUITE>           Run every test of one suite\n  --test <TEST>          Run one test on every suite that has it\n  --os and --test        Run exactly one test on one suite\n\nEXAMPLES:\n  aeagle --os zephyr\n  aeagle --test HeapOverflow\n  aeagle --os freertosv4 --test DoubleFree -v\n  aeagle --os riot-tlsf --port /dev/ttyUSB0 --timeout 60"
)]
pub struct CliArgs {
    // Test suite - Folder under tests/ (or a family member such as freertosv2)
    // 测试套件 - tests/ 下的目录名（或同族变体，例如 freertosv2）
    #[clap(short = 'o', long = "os", value_name = "SUITE", help = "Test-suite name (folder under tests/)")]
    pub suite: Option<String>,

    // Test name - Source file name without extension
    // 测试名称 - 不带扩展名的源文件名
    #[clap(short = 't', long = "test", value_name = "TEST", help = "Test name (without .c)")]
    pub test: Option<String>,

    // Verbose mode - Show more log information
    // 详细模式 - 显示更多日志信息
    #[clap(short = 'v', long = "verbose", help = "Enable verbose logging")]
    pub verbose: bool,

    // Quiet mode - Only errors are logged
    // 安静模式 - 只输出错误
    #[clap(short = 'q', long = "quiet", help = "Suppress non-essential output")]
    pub quiet: bool,

    // Config file - TOML file overriding built-in defaults
    // 配置文件 - 覆盖内置默认值的 TOML 文件
    #[clap(short = 'c', long = "config", value_name = "FILE", help = "Configuration file (default: <root>/aeagle.toml if present)")]
    pub config: Option<PathBuf>,

    // Project root - Directory holding tests/, apps/ and results/
    // 项目根目录 - 包含 tests/、apps/ 和 results/ 的目录
    #[clap(short = 'r', long = "root", value_name = "DIR", default_value = ".", help = "Project root directory")]
    pub root: PathBuf,

    // Serial device path
    // 串口设备路径
    #[clap(long = "port", value_name = "DEV", help = "Serial device path")]
    pub port: Option<String>,

    // Serial baud rate
    // 串口波特率
    #[clap(long = "baud", value_name = "RATE", help = "Serial baud rate")]
    pub baud: Option<u32>,

    // Capture timeout (seconds)
    // 采集超时时间（秒）
    #[clap(long = "timeout", value_name = "SECS", help = "Seconds to wait for the start/end banners")]
    pub timeout: Option<u64>,

    // List suites - Print the suite registry and exit
    // 列出套件 - 打印套件注册表后退出
    #[clap(short = 'l', long = "list", help = "List known suites and exit")]
    pub list: bool,
}

impl CliArgs {
    /// Parse command line arguments
    /// 解析命令行参数
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get log level
    /// 获取日志级别
    pub fn get_log_level(&self) -> &str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Get filter conditions
    /// 获取筛选条件 (suite, test)
    pub fn get_filters(&self) -> (Option<&str>, Option<&str>) {
        (self.suite.as_deref(), self.test.as_deref())
    }
}
