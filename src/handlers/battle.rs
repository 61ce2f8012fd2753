use crate::services::battle_clock;
use chrono::Utc;
use ntex::web::HttpResponse;

pub async fn get_battle() -> HttpResponse {
    HttpResponse::Ok().json(&battle_clock::battle_info(Utc::now()))
}
