use std::collections::BTreeMap;

use kite_common::{HttpInfo, JsonConverterFactory, Result};
use kite_macro::rest_client;
use serde::{Deserialize, Serialize};

/// 用户数据结构
#[derive(Debug, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
    email: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Post {
    #[serde(rename = "userId")]
    user_id: u32,
    id: Option<u32>,
    title: String,
    body: String,
}

/// JSONPlaceholder 的部分接口
#[rest_client(base_url = "https://jsonplaceholder.typicode.com", converter = JsonConverterFactory)]
trait Placeholder {
    /// 获取用户信息
    #[get("users/{id}")]
    async fn user(&self, #[path] id: u32) -> Result<User>;

    /// 获取所有用户
    #[get("users")]
    #[headers("Accept: application/json")]
    async fn users(&self) -> Result<Vec<User>>;

    /// 按条件筛选文章
    #[get("posts")]
    async fn posts(
        &self,
        #[query("userId")] user_id: Option<u32>,
        #[query_map] filters: &BTreeMap<String, String>,
    ) -> anyhow::Result<Vec<Post>>;

    /// 创建文章，同时关心状态码
    #[post("posts")]
    async fn create_post(&self, #[body] post: &Post) -> Result<HttpInfo<Post>>;

    #[form_url_encoded]
    #[put("posts/{id}")]
    async fn rename_post(&self, #[path] id: u32, #[field] title: &str) -> Result<String>;

    #[delete("posts/{id}")]
    async fn delete_post(&self, #[path] id: u32) -> Result<()>;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== Kite REST Client Basic Usage Example ===\n");
    let client = PlaceholderImpl::builder().build()?;

    println!("1. 获取单个用户");
    match client.user(1).await {
        Ok(user) => println!("   ✅ 获取用户: {} <{}>\n", user.name, user.email),
        Err(e) => println!("   ❌ 错误: {}\n", e),
    }

    println!("2. 获取所有用户");
    match client.users().await {
        Ok(users) => println!("   ✅ 获取 {} 个用户\n", users.len()),
        Err(e) => println!("   ❌ 错误: {}\n", e),
    }

    println!("3. 查询参数");
    let filters = BTreeMap::from([("_limit".to_string(), "3".to_string())]);
    match client.posts(Some(1), &filters).await {
        Ok(posts) => {
            for post in &posts {
                println!("   • [{}] {}", post.id.unwrap_or_default(), post.title);
            }
            println!();
        }
        Err(e) => println!("   ❌ 错误: {}\n", e),
    }

    println!("4. 创建文章");
    let post = Post {
        user_id: 1,
        id: None,
        title: "kite".to_string(),
        body: "declarative http clients".to_string(),
    };
    match client.create_post(&post).await {
        Ok(info) if info.is_success() => println!("   ✅ {} 创建成功: {:?}\n", info.status, info.body),
        Ok(info) => println!("   ⚠️ 服务端返回 {}\n", info.status),
        Err(e) => println!("   ❌ 错误: {}\n", e),
    }

    println!("5. 表单更新和删除");
    match client.rename_post(1, "renamed").await {
        Ok(body) => println!("   ✅ 响应 {} 字节", body.len()),
        Err(e) => println!("   ❌ 错误: {}", e),
    }
    match client.delete_post(1).await {
        Ok(()) => println!("   ✅ 已删除\n"),
        Err(e) => println!("   ❌ 错误: {}\n", e),
    }

    println!("🎉 所有示例运行完成！");
    Ok(())
}
