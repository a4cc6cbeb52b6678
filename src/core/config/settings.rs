use super::parsing::{
    env_optional, env_or_default, is_supported_file_extension, parse_bool, parse_cors_origins,
    parse_environment, parse_string_list, parse_u16, parse_u64, parse_usize,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    AdminSettings, ApiSettings, ConfigError, CorsSettings, DatabaseSettings, GroupingSettings,
    MailSettings, RedisSettings, RuntimeSettings, S3Settings, SecuritySettings, ServerHost,
    ServerPort, ServerSettings, Settings, StorageSettings, TelemetrySettings,
};

const DEFAULT_FILE_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt", "zip"];

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("DHUB_HOST", "0.0.0.0");
        let port = env_or_default("DHUB_PORT", "8000");

        let environment =
            parse_environment(env_optional("DHUB_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("DHUB_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Dissertation Hub API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let secret_key = match env_optional("SECRET_KEY") {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };
        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "10080"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "dhub");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "dissertation_hub");
        let database_url = env_optional("DATABASE_URL");

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port = parse_u16("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?;
        let redis_db = parse_u16("REDIS_DB", env_or_default("REDIS_DB", "0"))?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");

        let max_upload_size_mb =
            parse_u64("MAX_UPLOAD_SIZE_MB", env_or_default("MAX_UPLOAD_SIZE_MB", "25"))?;
        let allowed_file_extensions =
            parse_string_list(env_optional("ALLOWED_FILE_EXTENSIONS"), DEFAULT_FILE_EXTENSIONS);
        let presigned_url_expire_minutes = parse_u64(
            "PRESIGNED_URL_EXPIRE_MINUTES",
            env_or_default("PRESIGNED_URL_EXPIRE_MINUTES", "10"),
        )?;

        let s3_endpoint = env_or_default("S3_ENDPOINT", "http://localhost:9000");
        let s3_access_key = env_or_default("S3_ACCESS_KEY", "");
        let s3_secret_key = env_or_default("S3_SECRET_KEY", "");
        let s3_bucket = env_or_default("S3_BUCKET", "dissertation-hub");
        let s3_region = env_or_default("S3_REGION", "us-east-1");

        let mail_relay_url = env_or_default("MAIL_RELAY_URL", "");
        let mail_api_key = env_or_default("MAIL_RELAY_API_KEY", "");
        let mail_from_address = env_or_default("MAIL_FROM_ADDRESS", "no-reply@dissertation-hub.local");
        let mail_timeout_seconds =
            parse_u64("MAIL_TIMEOUT_SECONDS", env_or_default("MAIL_TIMEOUT_SECONDS", "10"))?;

        let default_group_size =
            parse_usize("DEFAULT_GROUP_SIZE", env_or_default("DEFAULT_GROUP_SIZE", "4"))?;
        let default_base_name = env_or_default("DEFAULT_GROUP_BASE_NAME", "Group");

        let first_superuser_username = env_or_default("FIRST_SUPERUSER_USERNAME", "admin");
        let first_superuser_email =
            env_or_default("FIRST_SUPERUSER_EMAIL", "admin@dissertation-hub.local");
        let first_superuser_password = env_or_default("FIRST_SUPERUSER_PASSWORD", "");

        let log_level = env_or_default("DHUB_LOG_LEVEL", "info");
        let json = env_optional("DHUB_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, access_token_expire_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            storage: StorageSettings {
                max_upload_size_mb,
                allowed_file_extensions,
                presigned_url_expire_minutes,
            },
            s3: S3Settings {
                endpoint: s3_endpoint,
                access_key: s3_access_key,
                secret_key: s3_secret_key,
                bucket: s3_bucket,
                region: s3_region,
            },
            mail: MailSettings {
                relay_url: mail_relay_url,
                api_key: mail_api_key,
                from_address: mail_from_address,
                timeout_seconds: mail_timeout_seconds,
            },
            grouping: GroupingSettings { default_group_size, default_base_name },
            admin: AdminSettings {
                first_superuser_username,
                first_superuser_email,
                first_superuser_password,
            },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn storage(&self) -> &StorageSettings {
        &self.storage
    }

    pub(crate) fn s3(&self) -> &S3Settings {
        &self.s3
    }

    pub(crate) fn mail(&self) -> &MailSettings {
        &self.mail
    }

    pub(crate) fn grouping(&self) -> &GroupingSettings {
        &self.grouping
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.allowed_file_extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ALLOWED_FILE_EXTENSIONS",
                value: String::from("<empty>"),
            });
        }

        for extension in &self.storage.allowed_file_extensions {
            if !is_supported_file_extension(extension) {
                return Err(ConfigError::InvalidValue {
                    field: "ALLOWED_FILE_EXTENSIONS",
                    value: extension.clone(),
                });
            }
        }

        if self.grouping.default_group_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DEFAULT_GROUP_SIZE",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.s3.access_key.is_empty() || self.s3.secret_key.is_empty() {
            return Err(ConfigError::MissingSecret("S3_ACCESS_KEY/S3_SECRET_KEY"));
        }
        if self.mail.is_enabled() && self.mail.api_key.is_empty() {
            return Err(ConfigError::MissingSecret("MAIL_RELAY_API_KEY"));
        }
        if self.admin.first_superuser_password.is_empty() {
            return Err(ConfigError::MissingSecret("FIRST_SUPERUSER_PASSWORD"));
        }

        Ok(())
    }
}
