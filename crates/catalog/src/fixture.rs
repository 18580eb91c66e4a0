//! Demo product set the storefront ships with.

use shared::domain::{Product, ProductId, ALL_CATEGORIES_LABEL};

pub static CATEGORIES: [&str; 8] = [
    ALL_CATEGORIES_LABEL,
    "手机",
    "电脑",
    "平板",
    "耳机",
    "手表",
    "家电",
    "游戏",
];

struct Row {
    id: i64,
    name: &'static str,
    price: u64,
    category: &'static str,
    sales: u64,
    image: &'static str,
    description: &'static str,
}

const ROWS: [Row; 12] = [
    Row {
        id: 1,
        name: "iPhone 15 Pro Max",
        price: 9999,
        category: "手机",
        sales: 5200,
        image: "https://via.placeholder.com/300x300?text=iPhone+15+Pro+Max",
        description: "苹果最新旗舰手机，A17 Pro芯片，钛金属边框",
    },
    Row {
        id: 2,
        name: "MacBook Pro 14英寸",
        price: 14999,
        category: "电脑",
        sales: 3200,
        image: "https://via.placeholder.com/300x300?text=MacBook+Pro",
        description: "M3 Pro芯片，14英寸Liquid Retina XDR显示屏",
    },
    Row {
        id: 3,
        name: "AirPods Pro 2",
        price: 1899,
        category: "耳机",
        sales: 8900,
        image: "https://via.placeholder.com/300x300?text=AirPods+Pro+2",
        description: "主动降噪，空间音频，MagSafe充电盒",
    },
    Row {
        id: 4,
        name: "iPad Pro 12.9英寸",
        price: 8999,
        category: "平板",
        sales: 2800,
        image: "https://via.placeholder.com/300x300?text=iPad+Pro",
        description: "M2芯片，12.9英寸Liquid Retina XDR显示屏",
    },
    Row {
        id: 5,
        name: "Apple Watch Ultra 2",
        price: 6499,
        category: "手表",
        sales: 2100,
        image: "https://via.placeholder.com/300x300?text=Apple+Watch+Ultra",
        description: "钛金属表壳，双频GPS，100米防水",
    },
    Row {
        id: 6,
        name: "华为 Mate 60 Pro",
        price: 6999,
        category: "手机",
        sales: 7500,
        image: "https://image.uniqlo.com/UQ/ST3/us/imagesgoods/482973/item/usgoods_03_482973_3x4.jpg",
        description: "麒麟9000S芯片，卫星通话功能",
    },
    Row {
        id: 7,
        name: "小米 14 Ultra",
        price: 6499,
        category: "手机",
        sales: 4300,
        image: "https://via.placeholder.com/300x300?text=Xiaomi+14+Ultra",
        description: "徕卡光学镜头，骁龙8 Gen 3处理器",
    },
    Row {
        id: 8,
        name: "戴森 V15 吸尘器",
        price: 4999,
        category: "家电",
        sales: 1800,
        image: "https://via.placeholder.com/300x300?text=Dyson+V15",
        description: "激光探测，LCD显示，60分钟续航",
    },
    Row {
        id: 9,
        name: "索尼 WH-1000XM5",
        price: 2499,
        category: "耳机",
        sales: 5600,
        image: "https://via.placeholder.com/300x300?text=Sony+WH-1000XM5",
        description: "业界领先降噪，30小时续航",
    },
    Row {
        id: 10,
        name: "联想 ThinkPad X1 Carbon",
        price: 12999,
        category: "电脑",
        sales: 1500,
        image: "https://via.placeholder.com/300x300?text=ThinkPad+X1",
        description: "碳纤维机身，14英寸2.8K OLED屏",
    },
    Row {
        id: 11,
        name: "三星 Galaxy S24 Ultra",
        price: 9699,
        category: "手机",
        sales: 3800,
        image: "https://via.placeholder.com/300x300?text=Galaxy+S24+Ultra",
        description: "骁龙8 Gen 3，200MP主摄，S Pen",
    },
    Row {
        id: 12,
        name: "任天堂 Switch OLED",
        price: 2099,
        category: "游戏",
        sales: 6200,
        image: "https://via.placeholder.com/300x300?text=Switch+OLED",
        description: "7英寸OLED屏幕，64GB存储",
    },
];

pub(crate) fn products() -> Vec<Product> {
    ROWS.iter()
        .map(|row| Product {
            id: ProductId(row.id),
            name: row.name.to_string(),
            category: row.category.to_string(),
            price: row.price,
            sales: row.sales,
            image: row.image.to_string(),
            description: row.description.to_string(),
        })
        .collect()
}
