use strum::EnumString;

/// 動作環境を表す
#[derive(Debug, Clone, Copy, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

/// 環境変数 ENV から動作環境を判定する
/// 未設定・不正な値の場合はビルドプロファイルに応じた既定値を使う
pub fn which() -> Environment {
    #[cfg(debug_assertions)]
    let default_env = Environment::Development;
    #[cfg(not(debug_assertions))]
    let default_env = Environment::Production;

    match std::env::var("ENV") {
        Err(_) => default_env,
        Ok(v) => v.parse().unwrap_or(default_env),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_environment() {
        assert!(matches!(
            "development".parse::<Environment>(),
            Ok(Environment::Development)
        ));
        assert!(matches!(
            "production".parse::<Environment>(),
            Ok(Environment::Production)
        ));
        assert!("staging".parse::<Environment>().is_err());
    }
}
