pub mod api;
pub mod core;

pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("photosafe_rust"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        // 桌面/服务端由宿主安装自己的 log 实现
        log::set_max_level(log::LevelFilter::Debug);
    }
}
