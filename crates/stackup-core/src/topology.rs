//! 固定トポロジー
//!
//! stackup が管理するサービス構成は1種類だけです。
//! データベースとキャッシュを先に起動し、アプリケーションのインストール後に残りを起動します。

use crate::model::{BuildSource, RestartPolicy, ServiceDefinition, StackManifest};
use crate::template::ScaffoldVars;

/// データベース（バッキングストア）
pub const DB_SERVICE: &str = "db";
/// キャッシュ
pub const CACHE_SERVICE: &str = "cache";
/// アプリケーションサーバー
pub const APP_SERVICE: &str = "app";
pub const PROXY_SERVICE: &str = "proxy";
pub const CRON_SERVICE: &str = "cron";
pub const IMAGINARY_SERVICE: &str = "imaginary";
pub const MAIL_SERVICE: &str = "mail";

/// readiness probe の前に要求するサービス
pub const BACKING_SERVICES: &[&str] = &[DB_SERVICE, CACHE_SERVICE];

/// データベースの永続ボリューム
pub const DB_VOLUME: &str = "db-data";

/// 初回インストールを行うスクリプト（app コンテナ内のパス）
pub const INSTALL_COMMAND: &str = "/usr/local/bin/stackup-install";
/// ベストエフォートで実行する依存インストールスクリプト
pub const INSTALL_DEPS_COMMAND: &str = "/usr/local/bin/stackup-install-deps";

/// 固定トポロジーからマニフェストを構築
pub fn stack_manifest(vars: &ScaffoldVars) -> StackManifest {
    let project = vars.project_name.as_str();
    let web_root_mount = format!("./{}:/var/www/html", vars.web_root);
    let app_tag = format!("{}/app:local", project);

    let services = vec![
        ServiceDefinition::new(DB_SERVICE, BuildSource::Image("mariadb:11".to_string()))
            .container_name(format!("{}-{}", project, DB_SERVICE))
            .env_file("services/db/db.env")
            .volume(format!("{}:/var/lib/mysql", DB_VOLUME))
            .restart(RestartPolicy::UnlessStopped),
        ServiceDefinition::new(
            CACHE_SERVICE,
            BuildSource::Image("redis:7-alpine".to_string()),
        )
        .container_name(format!("{}-{}", project, CACHE_SERVICE))
        .restart(RestartPolicy::UnlessStopped),
        ServiceDefinition::new(
            APP_SERVICE,
            BuildSource::Build {
                context: "services/app".to_string(),
                tag: app_tag.clone(),
            },
        )
        .container_name(format!("{}-{}", project, APP_SERVICE))
        .depends_on(&[DB_SERVICE, CACHE_SERVICE])
        .env_file("services/app/app.env")
        .volume(web_root_mount.clone())
        .restart(RestartPolicy::UnlessStopped),
        ServiceDefinition::new(
            IMAGINARY_SERVICE,
            BuildSource::Image("nextcloud/aio-imaginary:latest".to_string()),
        )
        .container_name(format!("{}-{}", project, IMAGINARY_SERVICE))
        .restart(RestartPolicy::UnlessStopped),
        ServiceDefinition::new(
            MAIL_SERVICE,
            BuildSource::Build {
                context: "services/mail".to_string(),
                tag: format!("{}/mail:local", project),
            },
        )
        .container_name(format!("{}-{}", project, MAIL_SERVICE))
        .env_file("services/mail/mail.env")
        .restart(RestartPolicy::UnlessStopped),
        ServiceDefinition::new(
            PROXY_SERVICE,
            BuildSource::Build {
                context: "services/proxy".to_string(),
                tag: format!("{}/proxy:local", project),
            },
        )
        .container_name(format!("{}-{}", project, PROXY_SERVICE))
        .depends_on(&[APP_SERVICE])
        .volume(format!("{}:ro", web_root_mount))
        .port(format!("{}:80", vars.http_port))
        .restart(RestartPolicy::UnlessStopped),
        ServiceDefinition::new(
            CRON_SERVICE,
            BuildSource::Build {
                context: "services/app".to_string(),
                tag: app_tag,
            },
        )
        .container_name(format!("{}-{}", project, CRON_SERVICE))
        .depends_on(&[APP_SERVICE])
        .env_file("services/app/app.env")
        .volume(web_root_mount)
        .entrypoint(&["/cron.sh"])
        .restart(RestartPolicy::UnlessStopped),
    ];

    StackManifest {
        project: project.to_string(),
        services,
        volumes: vec![DB_VOLUME.to_string()],
    }
}

/// バッキングサービス以外を依存順に並べたもの
pub fn dependent_services(manifest: &StackManifest) -> crate::Result<Vec<String>> {
    Ok(manifest
        .startup_order()?
        .into_iter()
        .filter(|name| !BACKING_SERVICES.contains(&name.as_str()))
        .collect())
}
