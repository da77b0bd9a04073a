use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // 初始化成就定义（按 name 幂等，重复执行不重复插入）
        let achievements_sql = r#"
INSERT INTO achievements (name, description, requirement_type, requirement_value, special_key, points, reward_kind, reward_ref, rarity, is_active)
VALUES
 ('First Steps', 'Earn 50 XP', 'xp', 50, NULL, 10, NULL, NULL, 'common', TRUE),
 ('Getting Warmed Up', 'Earn 250 XP', 'xp', 250, NULL, 25, 'badge', 'badge_warmed_up', 'common', TRUE),
 ('Seasoned Member', 'Earn 1000 XP', 'xp', 1000, NULL, 50, 'badge', 'badge_seasoned', 'rare', TRUE),
 ('Forum Veteran', 'Earn 5000 XP', 'xp', 5000, NULL, 150, 'title', 'title_veteran', 'epic', TRUE),
 ('Living Legend', 'Earn 20000 XP', 'xp', 20000, NULL, 500, 'frame', 'frame_legend', 'legendary', TRUE),
 ('First Post', 'Create your first post', 'posts', 1, NULL, 10, NULL, NULL, 'common', TRUE),
 ('Regular Author', 'Create 25 posts', 'posts', 25, NULL, 50, 'badge', 'badge_author', 'rare', TRUE),
 ('Prolific Writer', 'Create 100 posts', 'posts', 100, NULL, 200, 'title', 'title_writer', 'epic', TRUE),
 ('First Reply', 'Write your first reply', 'replies', 1, NULL, 5, NULL, NULL, 'common', TRUE),
 ('Conversationalist', 'Write 50 replies', 'replies', 50, NULL, 50, 'badge', 'badge_talker', 'rare', TRUE),
 ('Pillar of the Community', 'Write 500 replies', 'replies', 500, NULL, 250, 'title', 'title_pillar', 'epic', TRUE),
 ('Recruiter', 'Bring in your first confirmed referral', 'referrals', 1, NULL, 25, NULL, NULL, 'common', TRUE),
 ('Ambassador', 'Bring in 10 confirmed referrals', 'referrals', 10, NULL, 150, 'badge', 'badge_ambassador', 'epic', TRUE),
 ('Night Owl', 'Post something between midnight and 6 AM', 'special', 0, 'night_owl', 30, 'emoji', 'emoji_owl', 'rare', TRUE)
ON CONFLICT (name) DO NOTHING;
"#;
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            achievements_sql.to_string(),
        ))
        .await?;

        // 初始化版块（每日任务的 visit_category 槽位从这里抽取）
        let categories_sql = r#"
INSERT INTO categories (name, is_active)
VALUES
 ('General Discussion', TRUE),
 ('Show and Tell', TRUE),
 ('Help and Support', TRUE),
 ('Off Topic', TRUE)
ON CONFLICT (name) DO NOTHING;
"#;
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            categories_sql.to_string(),
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            "DELETE FROM achievements".to_string(),
        ))
        .await?;
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            "DELETE FROM categories".to_string(),
        ))
        .await?;
        Ok(())
    }
}
