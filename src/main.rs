use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use pulseboard_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::create_cors,
    models::{default_reward_catalog, default_template_pool},
    services::*,
    swagger::swagger_config,
    tasks,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 创建服务（任务模板与商店目录为静态配置，构造时注入）
    let points_service = PointsService::new(pool.clone());
    let reward_service = RewardService::new(
        pool.clone(),
        points_service.clone(),
        default_reward_catalog(),
    );
    let achievement_service = AchievementService::new(
        pool.clone(),
        points_service.clone(),
        reward_service.clone(),
    );
    let streak_service = StreakService::new(pool.clone());
    let mission_service = MissionService::new(
        pool.clone(),
        default_template_pool(),
        points_service.clone(),
        streak_service.clone(),
    );
    let referral_service = ReferralService::new(
        pool.clone(),
        points_service.clone(),
        config.progression.clone(),
    );
    let notification_service = NotificationService::new(pool.clone());
    let progression_service = ProgressionService::new(
        pool.clone(),
        config.progression.clone(),
        points_service.clone(),
        mission_service.clone(),
        achievement_service.clone(),
        streak_service.clone(),
        notification_service.clone(),
    );

    // 启动后台定时任务（每日任务生成 / 推荐结算）
    tasks::spawn_all(
        mission_service.clone(),
        referral_service.clone(),
        notification_service.clone(),
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(points_service.clone()))
            .app_data(web::Data::new(reward_service.clone()))
            .app_data(web::Data::new(achievement_service.clone()))
            .app_data(web::Data::new(streak_service.clone()))
            .app_data(web::Data::new(mission_service.clone()))
            .app_data(web::Data::new(referral_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .app_data(web::Data::new(progression_service.clone()))
            .configure(swagger_config)
            .service(web::scope("/api/v1").configure(handlers::api_config))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
