//! Application state shared across handlers

use crate::jwt::JwtService;
use crate::repositories::UserRepository;
use crate::repositories::label::LabelRepository;
use crate::repositories::recipe::RecipeRepository;
use crate::storage::ImageStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub recipe_repository: RecipeRepository,
    pub tag_repository: LabelRepository,
    pub ingredient_repository: LabelRepository,
    pub image_store: ImageStore,
}
