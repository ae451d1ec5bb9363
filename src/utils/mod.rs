pub mod db_utils;
pub mod schedule_cache;
