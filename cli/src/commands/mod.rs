mod helpers;
mod ingredient;
mod notify;
mod recipe;

pub(crate) use ingredient::{cmd_add, cmd_clear, cmd_edit, cmd_list, cmd_remove, cmd_scan};
pub(crate) use notify::cmd_notify;
pub(crate) use recipe::{
    cmd_recipe_favourites, cmd_recipe_find, cmd_recipe_save, cmd_recipe_search, cmd_recipe_show,
    cmd_recipe_suggest, cmd_recipe_unsave,
};
