//! Static substitutes used whenever the generative service is unavailable.

use std::sync::Arc;

use shared::domain::{
    CaffeineLevel, MenuCategories, MenuDatabase, MenuItem, TypeTag, UiButtons, UiContent,
    UiMessages,
};

fn basil_chicken() -> MenuItem {
    MenuItem {
        id: "mock-1".into(),
        name_th: "ข้าวผัดกะเพราไก่ไข่ดาว".into(),
        name_en: "Basil Chicken Fried Rice".into(),
        description_th: "อาหารยอดนิยม รสจัดจ้าน".into(),
        calories_kcal: 550.0,
        protein_g: 25.0,
        fat_g: 20.0,
        carb_g: 65.0,
        sugar_g: 5.0,
        fiber_g: 2.0,
        caffeine_level: CaffeineLevel::None,
        health_score: 6,
        type_tag: TypeTag::Normal,
    }
}

pub fn menu_database() -> MenuDatabase {
    let base = basil_chicken();
    let suki = MenuItem {
        id: "mock-2".into(),
        name_th: "สุกี้น้ำไก่".into(),
        calories_kcal: 350.0,
        health_score: 9,
        type_tag: TypeTag::Healthy,
        ..base.clone()
    };
    let fruit = MenuItem {
        id: "mock-3".into(),
        name_th: "ผลไม้รวม".into(),
        calories_kcal: 60.0,
        sugar_g: 10.0,
        type_tag: TypeTag::Healthy,
        ..base.clone()
    };
    let water = MenuItem {
        id: "mock-4".into(),
        name_th: "น้ำเปล่า".into(),
        calories_kcal: 0.0,
        sugar_g: 0.0,
        health_score: 10,
        type_tag: TypeTag::Healthy,
        ..base.clone()
    };

    MenuDatabase {
        version: "1.0".into(),
        categories: MenuCategories {
            main_dish: vec![Arc::new(base), Arc::new(suki)],
            snack: vec![Arc::new(fruit)],
            drink: vec![Arc::new(water)],
        },
    }
}

pub fn ui_content() -> UiContent {
    UiContent {
        buttons: UiButtons {
            spin_now: "หมุนเลย!".into(),
            spin_all: "สุ่มชุดอาหาร".into(),
            save_meal: "บันทึกมื้อนี้".into(),
            see_stats: "ดูสถิติ".into(),
        },
        messages: UiMessages {
            daily_success: vec!["เยี่ยมมาก!".into()],
            low_sugar_reward: vec!["ลดน้ำตาลเพื่อสุขภาพที่ดี".into()],
            high_caffeine_warning: vec!["ระวังคาเฟอีนเกินขนาด".into()],
        },
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::Category;

    use super::*;

    #[test]
    fn fallback_menu_has_every_category() {
        let db = menu_database();
        for category in Category::ALL {
            assert!(!db.items(category).is_empty(), "{category} is empty");
        }
        assert_eq!(db.total_items(), 4);
    }
}
