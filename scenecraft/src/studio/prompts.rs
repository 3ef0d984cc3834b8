/// 场景提示词必须携带的画质关键词。
pub const SCENE_QUALITY_KEYWORDS: &str = "High resolution, 8k, extreme detail, product photography masterpiece, sharp focus, professional lighting, cinematic composition";

/// 合成指令末尾的画质描述。
pub const SYNTHESIS_QUALITY_SUFFIX: &str = "Quality: 8k ultra-high resolution, extreme detail, 4000px, sharp focus, macro details, commercial standard, ray tracing.";

pub(super) fn analysis_prompt() -> String {
    format!(
        r#"You are a senior e-commerce visual director.
Analyze this background-removed product image and design 5 high-end product photography scenes that would significantly lift conversion.
Return a plain JSON array (no Markdown) in this shape:
[ {{ "title": "style title", "prompt": "detailed English image-generation prompt...", "reason": "why this scene suits the product, written in Traditional Chinese" }}, ... ]

Design directions:
1. Minimalist High-End
2. Authentic Lifestyle
3. Abstract Geometric
4. Nature & Organic
5. AI Recommendation: freely invent the most distinctive, best-selling scene for this product; prefix its title with '🤖 AI推薦：'

Mandatory rules:
1. Every "prompt" must end with these quality keywords:
"{SCENE_QUALITY_KEYWORDS}"
2. The "reason" field must be written in Traditional Chinese."#
    )
}

/// 组装合成指令，子句顺序固定：商品主体、参考图（可选）、场景、额外需求（可选）、画质。
pub(super) fn synthesis_prompt(
    scene_prompt: &str,
    extra_requirements: Option<&str>,
    has_reference: bool,
) -> String {
    let mut prompt = String::from(
        "Professional product photography masterpiece.\n\
         Subject: The FIRST image provided is the PRODUCT. KEEP THE PRODUCT APPEARANCE EXACTLY AS IS.",
    );
    if has_reference {
        prompt.push_str(
            "\nReference: The SECOND image provided is a STYLE/CHARACTER REFERENCE. \
             Integrate the product into a scene consistent with this reference.",
        );
    }
    prompt.push_str("\nBackground & Atmosphere: ");
    prompt.push_str(scene_prompt.trim());
    if let Some(extra) = extra_requirements.map(str::trim).filter(|extra| !extra.is_empty()) {
        prompt.push_str("\nAdditional User Requirements: ");
        prompt.push_str(extra);
    }
    prompt.push('\n');
    prompt.push_str(SYNTHESIS_QUALITY_SUFFIX);
    prompt
}
