mod monitor_key;
