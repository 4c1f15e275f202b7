// DTOモジュール
pub mod post_dto;
