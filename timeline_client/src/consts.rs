pub const DEFAULT_REST_API: &str = "https://api.twitter.com/1.1";
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36";

pub const HOME_TIMELINE_PATH: &str = "/statuses/home_timeline.json";
pub const UPDATE_STATUS_PATH: &str = "/statuses/update.json";

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const HOME_TIMELINE_MAX_COUNT: u32 = 200;
